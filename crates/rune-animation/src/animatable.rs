//! The capability contract the scheduler drives.
//!
//! An `Animatable` is an immutable definition of how a set of properties
//! changes over time. The scheduler never mutates it; all progress lives in the
//! `RunState` it creates per run. Built-in kinds live in [`crate::timeline`];
//! external kinds implement the trait directly.

use std::fmt;
use std::sync::Arc;

use crate::error::AnimationError;
use crate::run_state::{PropertySnapshot, RunState};
use crate::types::{AnimatableValue, PropertyKey, PropertySet, TargetId};

/// Shared handle to an animation definition. Identity is the allocation.
pub type AnimatableRef = Arc<dyn Animatable>;

pub trait Animatable: Send + Sync + fmt::Debug {
    /// Human readable name used in events and logs.
    fn name(&self) -> &str {
        ""
    }

    /// Create the execution state for a run bound to `target`.
    fn create_run_state(&self, target: &TargetId) -> RunState {
        RunState::new(target.clone())
    }

    /// Every property this run will mutate.
    fn animated_properties(&self, state: &RunState) -> PropertySet;

    /// Seed the run with the values its properties held before it took over.
    fn setup(&self, state: &mut RunState, baseline: &PropertySnapshot) {
        let animated = self.animated_properties(state);
        state.seed_baseline(baseline, &animated);
    }

    /// Start the run at local time `t0_ms`.
    fn start(&self, state: &mut RunState, t0_ms: f32);

    /// Advance the run's clock by `elapsed_ms`.
    fn advance(&self, state: &mut RunState, elapsed_ms: f32) -> Result<(), AnimationError>;

    /// Whether the run has naturally completed.
    fn is_complete(&self, state: &RunState) -> bool;

    /// Commit the run's final values. On a run that is not complete yet the
    /// current values are committed as they are.
    fn finalize(&self, state: &mut RunState) -> Result<(), AnimationError>;

    /// Terminate immediately without committing.
    fn force_stop(&self, state: &mut RunState);

    /// Current value of one animated property.
    fn current_value(&self, state: &RunState, key: &PropertyKey) -> Option<AnimatableValue> {
        state.value(key).cloned()
    }
}

/// Pointer identity of two animation handles.
pub fn same_animatable(a: &AnimatableRef, b: &AnimatableRef) -> bool {
    Arc::ptr_eq(a, b)
}
