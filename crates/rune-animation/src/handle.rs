//! Shared access to one scheduler from several threads.
//!
//! Every call takes the single lock for its whole duration, so a `start` from
//! the control thread never interleaves with an `advance` from the tick thread.

use std::sync::{Arc, Mutex, MutexGuard};

use rune_config::AnimationConfig;

use crate::animatable::AnimatableRef;
use crate::animator::{Animator, TickSummary};
use crate::error::Result;
use crate::events::AnimatorEvent;
use crate::run_state::PropertySnapshot;
use crate::types::{AnimationId, HandoffBehavior, TargetId};

/// Cloneable handle to a scheduler.
#[derive(Debug, Clone, Default)]
pub struct AnimatorHandle {
    inner: Arc<Mutex<Animator>>,
}

impl AnimatorHandle {
    pub fn new(animator: Animator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(animator)),
        }
    }

    pub fn with_config(config: &AnimationConfig) -> Result<Self> {
        Animator::with_config(config).map(Self::new)
    }

    /// Lock the scheduler. A lock poisoned by a panicking holder is recovered:
    /// every operation leaves the active set consistent before it returns.
    pub fn lock(&self) -> MutexGuard<'_, Animator> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with exclusive access to the scheduler.
    pub fn with<R>(&self, f: impl FnOnce(&mut Animator) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn start(
        &self,
        animatable: AnimatableRef,
        target: impl Into<TargetId>,
        handoff: HandoffBehavior,
    ) -> AnimationId {
        self.lock().start(animatable, target, handoff)
    }

    pub fn stop(&self, animatable: &AnimatableRef, target: &TargetId) -> bool {
        self.lock().stop(animatable, target)
    }

    pub fn stop_all(&self) {
        self.lock().stop_all();
    }

    pub fn advance(&self, delta_ms: f32) -> Result<TickSummary> {
        self.lock().advance(delta_ms)
    }

    pub fn has_active_animations(&self) -> bool {
        self.lock().has_active_animations()
    }

    pub fn take_pending_values(&self) -> PropertySnapshot {
        self.lock().take_pending_values()
    }

    pub fn drain_events(&self) -> Vec<AnimatorEvent> {
        self.lock().drain_events().collect()
    }
}

static_assertions::assert_impl_all!(AnimatorHandle: Send, Sync);
