#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rune_animation::{
    Animatable, AnimatableProperty, AnimatableRef, AnimationError, AnimationState, PropertyKey,
    PropertySet, RunState, TargetId,
};

/// Test animation that counts how often it is advanced.
///
/// Every animated property holds the run's elapsed time as its value, so the
/// committed values show how far a run got.
#[derive(Debug)]
pub struct Probe {
    name: String,
    properties: Vec<AnimatableProperty>,
    duration_ms: f32,
    fail_after_ms: Option<f32>,
    fail_on_finalize: bool,
    advances: AtomicUsize,
}

impl Probe {
    pub fn new(name: &str, properties: &[AnimatableProperty], duration_ms: f32) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            properties: properties.to_vec(),
            duration_ms,
            fail_after_ms: None,
            fail_on_finalize: false,
            advances: AtomicUsize::new(0),
        })
    }

    /// A probe whose advance fails once its clock reaches `fail_after_ms`.
    pub fn failing(
        name: &str,
        properties: &[AnimatableProperty],
        fail_after_ms: f32,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            properties: properties.to_vec(),
            duration_ms: f32::INFINITY,
            fail_after_ms: Some(fail_after_ms),
            fail_on_finalize: false,
            advances: AtomicUsize::new(0),
        })
    }

    /// A probe that advances normally but cannot commit its values.
    pub fn failing_finalize(
        name: &str,
        properties: &[AnimatableProperty],
        duration_ms: f32,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            properties: properties.to_vec(),
            duration_ms,
            fail_after_ms: None,
            fail_on_finalize: true,
            advances: AtomicUsize::new(0),
        })
    }

    pub fn advances(&self) -> usize {
        self.advances.load(Ordering::SeqCst)
    }

    fn write_values(&self, state: &mut RunState) {
        let elapsed = f64::from(state.elapsed_ms);
        for property in &self.properties {
            state
                .values
                .set(PropertyKey::new(&state.target, *property), elapsed.into());
        }
    }
}

impl Animatable for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn animated_properties(&self, state: &RunState) -> PropertySet {
        self.properties
            .iter()
            .map(|p| PropertyKey::new(&state.target, *p))
            .collect()
    }

    fn start(&self, state: &mut RunState, t0_ms: f32) {
        state.elapsed_ms = t0_ms;
        state.state = AnimationState::Running;
        self.write_values(state);
    }

    fn advance(&self, state: &mut RunState, elapsed_ms: f32) -> Result<(), AnimationError> {
        self.advances.fetch_add(1, Ordering::SeqCst);
        state.elapsed_ms += elapsed_ms;
        if self.fail_after_ms.is_some_and(|limit| state.elapsed_ms >= limit) {
            return Err(AnimationError::Failed(format!("{} broke", self.name)));
        }
        self.write_values(state);
        if state.elapsed_ms >= self.duration_ms {
            state.state = AnimationState::Finished;
        }
        Ok(())
    }

    fn is_complete(&self, state: &RunState) -> bool {
        state.state == AnimationState::Finished
    }

    fn finalize(&self, state: &mut RunState) -> Result<(), AnimationError> {
        if self.fail_on_finalize {
            return Err(AnimationError::Failed(format!("{} could not commit", self.name)));
        }
        state.state = AnimationState::Finished;
        Ok(())
    }

    fn force_stop(&self, state: &mut RunState) {
        state.restore_baseline();
        state.state = AnimationState::Cancelled;
    }
}

pub fn as_ref(probe: &Arc<Probe>) -> AnimatableRef {
    probe.clone()
}

pub fn key(target: &str, property: AnimatableProperty) -> PropertyKey {
    PropertyKey::new(TargetId::new(target), property)
}
