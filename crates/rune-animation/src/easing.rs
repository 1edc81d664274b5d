//! Timing curves applied to timeline progress.
//!
//! Two independent stages shape a run's progress:
//! - `SpeedProfile`: acceleration / deceleration ratios that warp elapsed time
//!   (accelerate, cruise at constant speed, decelerate), preserving total duration.
//! - `EasingFunction`: CSS-style curve mapping warped progress to output progress.
//!
//! ```
//! use rune_animation::easing::{EasingFunction, SpeedProfile};
//!
//! let profile = SpeedProfile::new(0.2, 0.2);
//! let warped = profile.warp(0.5).unwrap();
//! let eased = EasingFunction::EaseOut.evaluate(warped);
//! assert!(eased > 0.5);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Position of the jump for stepped easing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPosition {
    /// Jump at the start of each interval.
    Start,
    /// Jump at the end of each interval.
    #[default]
    End,
}

/// Easing function for animation timing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// No easing.
    #[default]
    Linear,
    /// `cubic-bezier(0.25, 0.1, 0.25, 1.0)`
    Ease,
    /// `cubic-bezier(0.42, 0, 1, 1)`
    EaseIn,
    /// `cubic-bezier(0, 0, 0.58, 1)`
    EaseOut,
    /// `cubic-bezier(0.42, 0, 0.58, 1)`
    EaseInOut,
    /// Custom cubic bezier curve.
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Discrete jumps. A zero count degrades to linear.
    Steps { count: u32, position: StepPosition },
}

impl EasingFunction {
    /// Evaluate the curve at `t` (clamped to 0.0..=1.0).
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
            Self::Steps { count, position } => stepped(*count, *position, t),
        }
    }

    /// Custom curve. Both x control points must lie in `[0, 1]`.
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self, AnimationError> {
        let in_range = |x: f32| (0.0..=1.0).contains(&x);
        if !in_range(x1) || !in_range(x2) {
            return Err(AnimationError::InvalidTiming(format!(
                "bezier x control points must be in [0, 1], got {x1} and {x2}"
            )));
        }
        Ok(Self::CubicBezier { x1, y1, x2, y2 })
    }

    pub fn steps(count: u32, position: StepPosition) -> Result<Self, AnimationError> {
        if count == 0 {
            return Err(AnimationError::InvalidTiming(
                "stepped easing needs at least one step".to_string(),
            ));
        }
        Ok(Self::Steps { count, position })
    }
}

fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    // Newton-Raphson on x(t) = progress, then evaluate y(t).
    let mut t = progress;
    for _ in 0..8 {
        let x = bezier_component(x1, x2, t) - progress;
        if x.abs() < 1e-6 {
            break;
        }
        let mt = 1.0 - t;
        let dx = 3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2);
        if dx.abs() < 1e-6 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }

    bezier_component(y1, y2, t)
}

/// 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_component(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

fn stepped(count: u32, position: StepPosition, t: f32) -> f32 {
    if count == 0 {
        return t;
    }
    let steps = count as f32;
    match position {
        StepPosition::Start => (t * steps).ceil() / steps,
        StepPosition::End => (t * steps).floor() / steps,
    }
}

/// Acceleration and deceleration phases of a timeline, as fractions of its
/// duration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpeedProfile {
    pub acceleration_ratio: f32,
    pub deceleration_ratio: f32,
}

impl SpeedProfile {
    pub fn new(acceleration_ratio: f32, deceleration_ratio: f32) -> Self {
        Self {
            acceleration_ratio,
            deceleration_ratio,
        }
    }

    /// Both ratios must be non-negative and sum to at most 1.
    pub fn validate(&self) -> Result<(), AnimationError> {
        let (accel, decel) = (self.acceleration_ratio, self.deceleration_ratio);
        if !accel.is_finite() || !decel.is_finite() || accel < 0.0 || decel < 0.0 {
            return Err(AnimationError::InvalidTiming(format!(
                "acceleration ({accel}) and deceleration ({decel}) ratios must be non-negative"
            )));
        }
        if accel + decel > 1.0 {
            return Err(AnimationError::InvalidTiming(format!(
                "sum of acceleration ({accel}) and deceleration ({decel}) ratios exceeds 1"
            )));
        }
        Ok(())
    }

    /// Map linear progress to warped progress. The warped curve reaches 1.0 at
    /// the same time as the linear one.
    pub fn warp(&self, t: f32) -> Result<f32, AnimationError> {
        self.validate()?;
        let t = t.clamp(0.0, 1.0);
        let (accel, decel) = (self.acceleration_ratio, self.deceleration_ratio);
        if accel == 0.0 && decel == 0.0 {
            return Ok(t);
        }

        let max_rate = 2.0 / (2.0 - (accel + decel));
        let warped = if t < accel {
            max_rate * t * t / (2.0 * accel)
        } else if t <= 1.0 - decel {
            max_rate * (t - accel / 2.0)
        } else {
            let remaining = 1.0 - t;
            1.0 - max_rate * remaining * remaining / (2.0 * decel)
        };
        Ok(warped.clamp(0.0, 1.0))
    }
}
