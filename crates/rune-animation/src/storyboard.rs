//! Parallel groups of timelines.
//!
//! Children start together once the storyboard's own begin delay has passed
//! and see only the time elapsed since then. Each child keeps its own run
//! state in `RunState::children`, index-aligned with `Storyboard::children`.

use serde::{Deserialize, Serialize};

use crate::animatable::Animatable;
use crate::error::AnimationError;
use crate::run_state::{PropertySnapshot, RunState};
use crate::timeline::Timeline;
use crate::types::{AnimationState, PropertySet, TargetId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Storyboard {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub begin_ms: f32,
    #[serde(default)]
    pub children: Vec<Timeline>,
}

impl Storyboard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn begin_ms(mut self, begin_ms: f32) -> Self {
        self.begin_ms = begin_ms;
        self
    }

    pub fn child(mut self, child: impl Into<Timeline>) -> Self {
        self.children.push(child.into());
        self
    }

    fn runs<'a>(
        &'a self,
        state: &'a RunState,
    ) -> impl Iterator<Item = (&'a Timeline, &'a RunState)> + 'a {
        self.children.iter().zip(state.children.iter())
    }

    fn runs_mut<'a>(
        &'a self,
        state: &'a mut RunState,
    ) -> impl Iterator<Item = (&'a Timeline, &'a mut RunState)> + 'a {
        self.children.iter().zip(state.children.iter_mut())
    }

    pub(crate) fn create_run_state(&self, target: &TargetId) -> RunState {
        let mut state = RunState::new(target.clone());
        state.children = self
            .children
            .iter()
            .map(|child| child.create_run_state(target))
            .collect();
        state
    }

    pub(crate) fn animated_properties(&self, state: &RunState) -> PropertySet {
        self.runs(state)
            .flat_map(|(child, child_state)| child.animated_properties(child_state))
            .collect()
    }

    pub(crate) fn setup(&self, state: &mut RunState, baseline: &PropertySnapshot) {
        for (child, child_state) in self.runs_mut(state) {
            child.setup(child_state, baseline);
        }
    }

    pub(crate) fn start(&self, state: &mut RunState, t0_ms: f32) {
        state.elapsed_ms = t0_ms.max(0.0);
        state.state = AnimationState::Pending;
        if state.elapsed_ms >= self.begin_ms {
            let offset = state.elapsed_ms - self.begin_ms;
            self.start_children(state, offset);
        }
    }

    fn start_children(&self, state: &mut RunState, t0_ms: f32) {
        for (child, child_state) in self.runs_mut(state) {
            child.start(child_state, t0_ms);
        }
        state.state = AnimationState::Running;
        self.merge_child_values(state);
    }

    pub(crate) fn advance(
        &self,
        state: &mut RunState,
        elapsed_ms: f32,
    ) -> Result<(), AnimationError> {
        if state.state.is_terminal() {
            return Ok(());
        }
        let before = state.elapsed_ms;
        state.elapsed_ms += elapsed_ms;
        if state.elapsed_ms < self.begin_ms {
            return Ok(());
        }

        let child_elapsed = if state.state == AnimationState::Pending {
            self.start_children(state, 0.0);
            state.elapsed_ms - self.begin_ms
        } else {
            state.elapsed_ms - before.max(self.begin_ms)
        };

        let mut outcome = Ok(());
        for (child, child_state) in self.runs_mut(state) {
            if child.is_complete(child_state) {
                continue;
            }
            if let Err(error) = child.advance(child_state, child_elapsed) {
                outcome = Err(error);
                break;
            }
        }
        self.merge_child_values(state);
        outcome?;

        if self
            .runs(state)
            .all(|(child, child_state)| child.is_complete(child_state))
        {
            state.state = AnimationState::Finished;
        }
        Ok(())
    }

    pub(crate) fn finalize(&self, state: &mut RunState) -> Result<(), AnimationError> {
        for (child, child_state) in self.runs_mut(state) {
            child.finalize(child_state)?;
        }
        self.merge_child_values(state);
        state.state = AnimationState::Finished;
        Ok(())
    }

    pub(crate) fn force_stop(&self, state: &mut RunState) {
        for (child, child_state) in self.runs_mut(state) {
            child.force_stop(child_state);
        }
        self.merge_child_values(state);
        state.state = AnimationState::Cancelled;
    }

    /// Later children win on shared keys.
    fn merge_child_values(&self, state: &mut RunState) {
        let mut merged = PropertySnapshot::new();
        for child_state in &state.children {
            merged.merge(&child_state.values);
        }
        state.values = merged;
    }
}
