//! Core animation types and data structures.
//!
//! This module defines the fundamental types shared by the scheduler and the
//! built-in timelines:
//! - `AnimationId`: Unique identifier for a scheduled animation run
//! - `TargetId`: Opaque identity of the visual element a run is bound to
//! - `AnimatableProperty` / `PropertyKey`: What an animation mutates
//! - `AnimatableValue`: Enum for all animatable property values
//! - `AnimationState`: Current state of a run
//! - `HandoffBehavior`: How a new run coexists with conflicting runs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::AnimatorError;

/// Unique identifier for a scheduled animation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimationId(pub u64);

impl AnimationId {
    /// Generate a new unique animation ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for AnimationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of the visual element an animation run is bound to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&TargetId> for TargetId {
    fn from(id: &TargetId) -> Self {
        id.clone()
    }
}

/// Current state of an animation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationState {
    /// Run has been created but has not reached its begin time.
    #[default]
    Pending,
    /// Run is actively animating.
    Running,
    /// Run has completed normally.
    Finished,
    /// Run was cut off before completion.
    Cancelled,
}

impl AnimationState {
    /// Returns true once the run can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Cancelled)
    }
}

/// Rule governing how a newly started animation coexists with running
/// animations that touch at least one of the same properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffBehavior {
    /// The new run waits until every conflicting run has left the active set.
    Compose,
    /// Conflicting runs are paused until the new run has completed, then resume.
    TemporaryReplace,
    /// Conflicting runs commit their current values and are evicted immediately.
    #[default]
    SnapshotAndReplace,
}

impl HandoffBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compose => "compose",
            Self::TemporaryReplace => "temporary_replace",
            Self::SnapshotAndReplace => "snapshot_and_replace",
        }
    }
}

impl fmt::Display for HandoffBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandoffBehavior {
    type Err = AnimatorError;

    /// Accepts snake_case, kebab-case and PascalCase spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "compose" => Ok(Self::Compose),
            "temporaryreplace" => Ok(Self::TemporaryReplace),
            "snapshotandreplace" => Ok(Self::SnapshotAndReplace),
            _ => Err(AnimatorError::UnknownHandoff(s.to_string())),
        }
    }
}

/// Visibility state for elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Element is visible and participates in layout.
    #[default]
    Visible,
    /// Element is invisible but still participates in layout.
    Hidden,
    /// Element is removed from layout.
    Collapsed,
}

/// Edge insets for padding/margin animation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimatableEdgeInsets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl AnimatableEdgeInsets {
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// 2D transform for position, scale, and rotation animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimatableTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in radians.
    pub rotate: f64,
}

impl Default for AnimatableTransform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotate: 0.0,
        }
    }
}

/// Box shadow properties for animation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimatableBoxShadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    /// RGBA color components.
    pub color: [f32; 4],
}

impl AnimatableBoxShadow {
    pub fn new(offset_x: f64, offset_y: f64, blur: f64, color: [f32; 4]) -> Self {
        Self {
            offset_x,
            offset_y,
            blur,
            color,
        }
    }
}

/// Enum representing all animatable value types.
///
/// This enum wraps the different types of values that can be animated,
/// allowing the scheduler to snapshot and hand them over uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimatableValue {
    /// Numeric value (width, height, opacity, font_size, etc.)
    F64 { value: f64 },
    /// RGBA color value in linear premultiplied space.
    Color { rgba: [f32; 4] },
    /// Edge insets for padding/margin.
    EdgeInsets {
        #[serde(flatten)]
        insets: AnimatableEdgeInsets,
    },
    /// 2D transform (translate, scale, rotate).
    Transform {
        #[serde(flatten)]
        transform: AnimatableTransform,
    },
    /// Box shadow parameters.
    BoxShadow {
        #[serde(flatten)]
        shadow: AnimatableBoxShadow,
    },
    /// Visibility state (visible, hidden, collapsed).
    Visibility { value: Visibility },
}

/// Generates the conversions, accessors and type tag for each value kind.
macro_rules! value_kinds {
    ($($variant:ident { $field:ident: $ty:ty } => $accessor:ident,)+) => {
        impl AnimatableValue {
            /// The variant of this value.
            pub fn value_type(&self) -> AnimatableValueType {
                match self {
                    $(Self::$variant { .. } => AnimatableValueType::$variant,)+
                }
            }

            $(
                pub fn $accessor(&self) -> Option<$ty> {
                    match self {
                        Self::$variant { $field } => Some(*$field),
                        _ => None,
                    }
                }
            )+
        }

        $(
            impl From<$ty> for AnimatableValue {
                fn from($field: $ty) -> Self {
                    Self::$variant { $field }
                }
            }
        )+
    };
}

value_kinds! {
    F64 { value: f64 } => as_f64,
    Color { rgba: [f32; 4] } => as_color,
    EdgeInsets { insets: AnimatableEdgeInsets } => as_edge_insets,
    Transform { transform: AnimatableTransform } => as_transform,
    BoxShadow { shadow: AnimatableBoxShadow } => as_box_shadow,
    Visibility { value: Visibility } => as_visibility,
}

/// Declares `AnimatableProperty` from a table of
/// `Name: value kind[, layout];` rows.
macro_rules! animatable_properties {
    (@layout layout) => { true };
    (@layout) => { false };
    ($($(#[$meta:meta])* $property:ident: $kind:ident $(, $layout:ident)?;)+) => {
        /// A visual property an animation can drive.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum AnimatableProperty {
            $($(#[$meta])* $property,)+
        }

        impl AnimatableProperty {
            /// Every property, in declaration order.
            pub const ALL: &'static [AnimatableProperty] = &[$(Self::$property,)+];

            /// Kind of value this property takes.
            pub fn value_type(&self) -> AnimatableValueType {
                match self {
                    $(Self::$property => AnimatableValueType::$kind,)+
                }
            }

            /// Whether animating this property moves or resizes other elements.
            pub fn affects_layout(&self) -> bool {
                match self {
                    $(Self::$property => animatable_properties!(@layout $($layout)?),)+
                }
            }
        }
    };
}

animatable_properties! {
    Width: F64, layout;
    Height: F64, layout;
    MinWidth: F64, layout;
    MinHeight: F64, layout;
    MaxWidth: F64, layout;
    MaxHeight: F64, layout;
    Padding: EdgeInsets, layout;
    Margin: EdgeInsets, layout;
    Opacity: F64;
    /// Collapsing an element removes it from layout.
    Visibility: Visibility, layout;
    CornerRadius: F64;
    BorderWidth: F64;
    BorderColor: Color;
    BackgroundColor: Color;
    FontSize: F64, layout;
    TextColor: Color;
    TranslateX: F64;
    TranslateY: F64;
    ScaleX: F64;
    ScaleY: F64;
    /// Radians.
    Rotate: F64;
    /// Translate, scale and rotate as one value.
    Transform: Transform;
    BoxShadow: BoxShadow;
}

impl AnimatableProperty {
    pub fn is_visual_only(&self) -> bool {
        !self.affects_layout()
    }
}

/// Expected value type for an animatable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimatableValueType {
    F64,
    Color,
    EdgeInsets,
    Transform,
    BoxShadow,
    Visibility,
}

/// A single property of a single target. Two animations conflict when they
/// touch at least one common key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyKey {
    pub target: TargetId,
    pub property: AnimatableProperty,
}

impl PropertyKey {
    pub fn new(target: impl Into<TargetId>, property: AnimatableProperty) -> Self {
        Self {
            target: target.into(),
            property,
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:?}", self.target, self.property)
    }
}

/// Ordered set of property keys; ordering keeps conflict scans deterministic.
pub type PropertySet = BTreeSet<PropertyKey>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_id_uniqueness() {
        let id1 = AnimationId::new();
        let id2 = AnimationId::new();
        let id3 = AnimationId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
        assert!(id1 < id2 && id2 < id3);
    }

    #[test]
    fn test_animation_state_default() {
        assert_eq!(AnimationState::default(), AnimationState::Pending);
        assert!(AnimationState::Finished.is_terminal());
        assert!(AnimationState::Cancelled.is_terminal());
        assert!(!AnimationState::Running.is_terminal());
    }

    #[test]
    fn test_handoff_parsing() {
        assert_eq!("compose".parse::<HandoffBehavior>().unwrap(), HandoffBehavior::Compose);
        assert_eq!(
            "temporary-replace".parse::<HandoffBehavior>().unwrap(),
            HandoffBehavior::TemporaryReplace
        );
        assert_eq!(
            "SnapshotAndReplace".parse::<HandoffBehavior>().unwrap(),
            HandoffBehavior::SnapshotAndReplace
        );
        assert_eq!(
            " snapshot_and_replace ".parse::<HandoffBehavior>().unwrap(),
            HandoffBehavior::SnapshotAndReplace
        );
    }

    #[test]
    fn test_unknown_handoff_is_an_error() {
        let err = "crossfade".parse::<HandoffBehavior>().unwrap_err();
        assert!(matches!(err, AnimatorError::UnknownHandoff(ref name) if name == "crossfade"));
    }

    #[test]
    fn test_handoff_display_round_trips() {
        for handoff in [
            HandoffBehavior::Compose,
            HandoffBehavior::TemporaryReplace,
            HandoffBehavior::SnapshotAndReplace,
        ] {
            assert_eq!(handoff.to_string().parse::<HandoffBehavior>().unwrap(), handoff);
        }
    }

    #[test]
    fn test_animatable_value_conversions() {
        let v: AnimatableValue = 42.0.into();
        assert_eq!(v.as_f64(), Some(42.0));
        assert_eq!(v.as_color(), None);
        assert_eq!(v.value_type(), AnimatableValueType::F64);

        let v: AnimatableValue = [1.0_f32, 0.5, 0.0, 1.0].into();
        assert_eq!(v.as_color(), Some([1.0, 0.5, 0.0, 1.0]));
        assert_eq!(v.value_type(), AnimatableValueType::Color);

        let v: AnimatableValue = AnimatableEdgeInsets::uniform(10.0).into();
        assert_eq!(v.as_edge_insets().unwrap().left, 10.0);

        let t = AnimatableTransform {
            translate_x: 100.0,
            scale_x: 2.0,
            ..Default::default()
        };
        let v: AnimatableValue = t.into();
        let extracted = v.as_transform().unwrap();
        assert_eq!(extracted.translate_x, 100.0);
        assert_eq!(extracted.scale_y, 1.0);

        let v: AnimatableValue = Visibility::Hidden.into();
        assert_eq!(v.as_visibility(), Some(Visibility::Hidden));
    }

    #[test]
    fn test_property_value_types() {
        assert_eq!(AnimatableProperty::Width.value_type(), AnimatableValueType::F64);
        assert_eq!(
            AnimatableProperty::BackgroundColor.value_type(),
            AnimatableValueType::Color
        );
        assert_eq!(
            AnimatableProperty::Padding.value_type(),
            AnimatableValueType::EdgeInsets
        );
        assert_eq!(
            AnimatableProperty::Transform.value_type(),
            AnimatableValueType::Transform
        );
        assert!(AnimatableProperty::Width.affects_layout());
        assert!(AnimatableProperty::Visibility.affects_layout());
        assert!(AnimatableProperty::Opacity.is_visual_only());
    }

    #[test]
    fn test_property_table() {
        assert_eq!(AnimatableProperty::ALL.len(), 23);
        let layout = AnimatableProperty::ALL
            .iter()
            .filter(|p| p.affects_layout())
            .count();
        assert_eq!(layout, 10);
        assert_eq!(
            serde_json::to_string(&AnimatableProperty::BackgroundColor).unwrap(),
            "\"background_color\""
        );
    }

    #[test]
    fn test_property_keys_are_per_target() {
        let a = PropertyKey::new("button", AnimatableProperty::Opacity);
        let b = PropertyKey::new("label", AnimatableProperty::Opacity);
        assert_ne!(a, b);

        let set: PropertySet = [b.clone(), a.clone()].into_iter().collect();
        let ordered: Vec<_> = set.into_iter().collect();
        assert_eq!(ordered, vec![a, b]);
    }
}
