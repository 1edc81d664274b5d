//! Error types for the animation scheduler.

use thiserror::Error;

use crate::types::{AnimatableProperty, AnimatableValueType, AnimationId, TargetId};

/// Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, AnimatorError>;

/// Failures reported by an animation while it is advanced or finalized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Timing parameters cannot be evaluated.
    #[error("invalid timing: {0}")]
    InvalidTiming(String),

    /// Start and end values are different kinds of value.
    #[error("cannot interpolate {property:?} from {from:?} to {to:?}")]
    ValueMismatch {
        property: AnimatableProperty,
        from: AnimatableValueType,
        to: AnimatableValueType,
    },

    /// Keyframe animation without keyframes.
    #[error("keyframe animation '{0}' has no keyframes")]
    EmptyKeyframes(String),

    /// Failure raised by an external animation implementation.
    #[error("{0}")]
    Failed(String),
}

/// One run that was evicted because its animation failed during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextFailure {
    pub animation_id: AnimationId,
    pub target: TargetId,
    pub name: String,
    pub error: AnimationError,
}

/// Errors surfaced by the scheduler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimatorError {
    /// Handoff policy name that does not map to a known policy.
    #[error("unknown handoff behavior '{0}'")]
    UnknownHandoff(String),

    /// Tick delta that is negative or not a finite number.
    #[error("elapsed time must be finite and non-negative, got {0}ms")]
    InvalidElapsed(f32),

    /// One or more runs failed during a tick. Every other run was still advanced.
    #[error("{} animation(s) failed during tick", failures.len())]
    AnimationsFailed { failures: Vec<ContextFailure> },

    /// Scheduler configuration rejected.
    #[error("invalid animation config: {0}")]
    Config(String),
}
