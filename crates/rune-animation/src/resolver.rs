//! Read-side helper for the code that draws animated targets.
//!
//! The `AnimatedPropertyResolver` answers "what should this property look like
//! right now": the live value of the run that owns it, else a value waiting to
//! be applied, else the caller's base value.

use crate::animator::Animator;
use crate::types::{
    AnimatableBoxShadow, AnimatableEdgeInsets, AnimatableProperty, AnimatableTransform,
    AnimatableValue, PropertyKey, TargetId, Visibility,
};

/// Resolves animated property values for one frame.
///
/// # Usage
///
/// ```ignore
/// let resolver = AnimatedPropertyResolver::new(&animator);
/// let width = resolver.resolve_f64(&target, AnimatableProperty::Width, 100.0);
/// let bg = resolver.resolve_color(&target, AnimatableProperty::BackgroundColor, [1.0; 4]);
/// ```
pub struct AnimatedPropertyResolver<'a> {
    animator: &'a Animator,
}

impl<'a> AnimatedPropertyResolver<'a> {
    pub fn new(animator: &'a Animator) -> Self {
        Self { animator }
    }

    pub fn animator(&self) -> &Animator {
        self.animator
    }

    /// Live value first, then the pending value, otherwise `None`.
    pub fn resolve(
        &self,
        target: &TargetId,
        property: AnimatableProperty,
    ) -> Option<AnimatableValue> {
        self.animator.animated_value(target, property).or_else(|| {
            self.animator
                .pending_value(&PropertyKey::new(target, property))
                .cloned()
        })
    }

    pub fn resolve_f64(&self, target: &TargetId, property: AnimatableProperty, base: f64) -> f64 {
        self.resolve(target, property)
            .and_then(|v| v.as_f64())
            .unwrap_or(base)
    }

    pub fn resolve_color(
        &self,
        target: &TargetId,
        property: AnimatableProperty,
        base: [f32; 4],
    ) -> [f32; 4] {
        self.resolve(target, property)
            .and_then(|v| v.as_color())
            .unwrap_or(base)
    }

    pub fn resolve_edge_insets(
        &self,
        target: &TargetId,
        property: AnimatableProperty,
        base: AnimatableEdgeInsets,
    ) -> AnimatableEdgeInsets {
        self.resolve(target, property)
            .and_then(|v| v.as_edge_insets())
            .unwrap_or(base)
    }

    /// Grouped transform with individual component animations applied on top.
    pub fn resolve_transform(
        &self,
        target: &TargetId,
        base: AnimatableTransform,
    ) -> AnimatableTransform {
        let mut transform = self
            .resolve(target, AnimatableProperty::Transform)
            .and_then(|v| v.as_transform())
            .unwrap_or(base);

        let components: [(AnimatableProperty, &mut f64); 5] = [
            (AnimatableProperty::TranslateX, &mut transform.translate_x),
            (AnimatableProperty::TranslateY, &mut transform.translate_y),
            (AnimatableProperty::ScaleX, &mut transform.scale_x),
            (AnimatableProperty::ScaleY, &mut transform.scale_y),
            (AnimatableProperty::Rotate, &mut transform.rotate),
        ];
        for (property, slot) in components {
            if let Some(v) = self.resolve(target, property).and_then(|v| v.as_f64()) {
                *slot = v;
            }
        }
        transform
    }

    pub fn resolve_box_shadow(
        &self,
        target: &TargetId,
        base: AnimatableBoxShadow,
    ) -> AnimatableBoxShadow {
        self.resolve(target, AnimatableProperty::BoxShadow)
            .and_then(|v| v.as_box_shadow())
            .unwrap_or(base)
    }

    /// Clamped to [0.0, 1.0].
    pub fn resolve_opacity(&self, target: &TargetId, base: f64) -> f64 {
        self.resolve_f64(target, AnimatableProperty::Opacity, base)
            .clamp(0.0, 1.0)
    }

    pub fn resolve_visibility(&self, target: &TargetId, base: Visibility) -> Visibility {
        self.resolve(target, AnimatableProperty::Visibility)
            .and_then(|v| v.as_visibility())
            .unwrap_or(base)
    }

    /// Whether any active run animates a property of `target`.
    pub fn has_animations_for_target(&self, target: &TargetId) -> bool {
        self.animator
            .contexts()
            .any(|ctx| ctx.animated_properties().iter().any(|k| k.target == *target))
    }

    /// Whether any active run animates a layout-affecting property of `target`.
    pub fn has_layout_animations_for_target(&self, target: &TargetId) -> bool {
        self.animator.contexts().any(|ctx| {
            ctx.animated_properties()
                .iter()
                .any(|k| k.target == *target && k.property.affects_layout())
        })
    }
}
