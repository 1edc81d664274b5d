//! Interpolation for animatable values.
//!
//! Colors are blended per stored channel. Composite values blend each field
//! on its own; visibility is discrete.

use crate::types::{
    AnimatableBoxShadow, AnimatableEdgeInsets, AnimatableTransform, AnimatableValue, Visibility,
};

/// Blend between two values of the same kind.
///
/// `t = 0.0` yields `self` and `t = 1.0` yields `to`.
pub trait Interpolate: Sized {
    fn interpolate(&self, to: &Self, t: f32) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        self + (to - self) * f64::from(t)
    }
}

impl Interpolate for f32 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl<const N: usize> Interpolate for [f32; N] {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        std::array::from_fn(|i| self[i].interpolate(&to[i], t))
    }
}

/// Field-wise blend for plain structs of interpolable fields.
macro_rules! interpolate_fields {
    ($ty:ty { $($field:ident),+ }) => {
        impl Interpolate for $ty {
            fn interpolate(&self, to: &Self, t: f32) -> Self {
                Self {
                    $($field: self.$field.interpolate(&to.$field, t),)+
                }
            }
        }
    };
}

interpolate_fields!(AnimatableEdgeInsets { top, right, bottom, left });
interpolate_fields!(AnimatableTransform { translate_x, translate_y, scale_x, scale_y, rotate });
interpolate_fields!(AnimatableBoxShadow { offset_x, offset_y, blur, color });

impl Interpolate for Visibility {
    /// Visible wins for the whole transition when either end is visible.
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        match t {
            t if t <= 0.0 => *self,
            t if t >= 1.0 => *to,
            _ if *self == Visibility::Visible || *to == Visibility::Visible => {
                Visibility::Visible
            }
            _ => *self,
        }
    }
}

impl Interpolate for AnimatableValue {
    /// Values of different kinds do not blend; the start value is kept.
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        let from = self;
        macro_rules! blend {
            ($($variant:ident { $field:ident }),+ $(,)?) => {
                match (from, to) {
                    $(
                        (Self::$variant { $field: a }, Self::$variant { $field: b }) => {
                            Self::$variant { $field: a.interpolate(b, t) }
                        }
                    )+
                    _ => from.clone(),
                }
            };
        }

        blend!(
            F64 { value },
            Color { rgba },
            EdgeInsets { insets },
            Transform { transform },
            BoxShadow { shadow },
            Visibility { value },
        )
    }
}
