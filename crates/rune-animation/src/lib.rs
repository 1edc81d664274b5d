//! Animation scheduling and property conflict resolution.
//!
//! This crate provides:
//! - **Timelines**: property, keyframe and storyboard animations with repeat,
//!   auto-reverse, speed and fill behavior
//! - **Animator**: the scheduler that starts, stops and ticks animation runs
//! - **Handoff**: how a new run takes properties over from runs already
//!   animating them (compose, temporary replace, snapshot and replace)
//! - **Events**: lifecycle notifications for the owner of the scheduler
//!
//! # Architecture
//!
//! ```text
//! Animator
//!   ├── Active contexts (animation + target + run state + wait set)
//!   ├── Pending values (committed or restored, waiting to be applied)
//!   └── Event queue
//!
//! find_conflicts
//!   └── Decides which active contexts a new run takes properties from
//!
//! AnimatorHandle
//!   └── Shares one Animator between a control thread and a tick thread
//!
//! AnimatedPropertyResolver
//!   └── Queries the animator for current values while drawing
//! ```

pub mod animatable;
pub mod animator;
pub mod conflict;
pub mod context;
pub mod easing;
pub mod error;
pub mod events;
pub mod handle;
pub mod interpolate;
pub mod keyframes;
pub mod property;
pub mod resolver;
pub mod run_state;
pub mod storyboard;
pub mod timeline;
pub mod types;

pub use animatable::{Animatable, AnimatableRef, same_animatable};
pub use animator::{Animator, TickSummary};
pub use conflict::{Conflicts, find_conflicts, properties_overlap};
pub use context::{AnimationContext, ContextKey};
pub use easing::{EasingFunction, SpeedProfile, StepPosition};
pub use error::{AnimationError, AnimatorError, ContextFailure, Result};
pub use events::{AnimatorEvent, EventQueue};
pub use handle::AnimatorHandle;
pub use interpolate::Interpolate;
pub use keyframes::{Keyframe, KeyframeAnimation};
pub use property::PropertyAnimation;
pub use resolver::AnimatedPropertyResolver;
pub use run_state::{PropertySnapshot, RunState};
pub use storyboard::Storyboard;
pub use timeline::{FillBehavior, RepeatBehavior, Timeline, Timing};
pub use types::{
    AnimatableProperty, AnimatableValue, AnimationId, AnimationState, HandoffBehavior,
    PropertyKey, PropertySet, TargetId,
};
