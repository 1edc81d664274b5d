//! Built-in animation kinds and their shared timing model.
//!
//! `Timeline` is the closed set of animation kinds the scene layer ships:
//! single-property animations, keyframe tracks and storyboards grouping them.
//! It implements [`Animatable`], so the scheduler drives every kind through
//! the same contract.
//!
//! # Timing
//!
//! ```text
//!  begin_ms     duration_ms      duration_ms (auto_reverse)
//! |--------|=================>|<=================|  x repeat
//!  Pending   Running (forward)   Running (backward)   -> Finished
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::animatable::{Animatable, AnimatableRef};
use crate::easing::{EasingFunction, SpeedProfile};
use crate::error::AnimationError;
use crate::keyframes::KeyframeAnimation;
use crate::property::PropertyAnimation;
use crate::run_state::{PropertySnapshot, RunState};
use crate::storyboard::Storyboard;
use crate::types::{AnimationState, PropertySet, TargetId};

/// How often a timeline plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RepeatBehavior {
    #[default]
    Once,
    Count { count: u32 },
    Forever,
}

impl RepeatBehavior {
    fn iterations(&self) -> Option<u32> {
        match self {
            Self::Once => Some(1),
            Self::Count { count } => Some((*count).max(1)),
            Self::Forever => None,
        }
    }
}

/// What a run leaves behind when it completes naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillBehavior {
    /// Commit the end values.
    #[default]
    HoldEnd,
    /// Commit the baseline values.
    Stop,
}

/// Timing parameters shared by leaf timelines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub begin_ms: f32,
    pub duration_ms: f32,
    pub auto_reverse: bool,
    pub repeat: RepeatBehavior,
    pub fill: FillBehavior,
    pub speed: SpeedProfile,
    pub easing: EasingFunction,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            begin_ms: 0.0,
            duration_ms: 0.0,
            auto_reverse: false,
            repeat: RepeatBehavior::Once,
            fill: FillBehavior::HoldEnd,
            speed: SpeedProfile::default(),
            easing: EasingFunction::Linear,
        }
    }
}

/// Where a run stands on its timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ClockPosition {
    BeforeBegin,
    Active { progress: f32, iteration: u32 },
    Completed { progress: f32, iteration: u32 },
}

impl Timing {
    pub fn with_duration(duration_ms: f32) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    pub fn begin_ms(mut self, begin_ms: f32) -> Self {
        self.begin_ms = begin_ms;
        self
    }

    pub fn auto_reverse(mut self, auto_reverse: bool) -> Self {
        self.auto_reverse = auto_reverse;
        self
    }

    pub fn repeat(mut self, repeat: RepeatBehavior) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn fill(mut self, fill: FillBehavior) -> Self {
        self.fill = fill;
        self
    }

    pub fn speed(mut self, acceleration_ratio: f32, deceleration_ratio: f32) -> Self {
        self.speed = SpeedProfile::new(acceleration_ratio, deceleration_ratio);
        self
    }

    pub fn easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Total active time after the begin delay; `None` when repeating forever.
    pub fn active_duration_ms(&self) -> Option<f32> {
        let cycle = self.cycle_ms();
        self.repeat.iterations().map(|n| cycle * n as f32)
    }

    fn cycle_ms(&self) -> f32 {
        let duration = self.duration_ms.max(0.0);
        if self.auto_reverse { duration * 2.0 } else { duration }
    }

    fn end_progress(&self) -> f32 {
        if self.auto_reverse { 0.0 } else { 1.0 }
    }

    /// Linear progress at `elapsed_ms` (time since start, begin delay included).
    /// A zero-length timeline completes as soon as it begins.
    pub(crate) fn position(&self, elapsed_ms: f32) -> ClockPosition {
        let local = elapsed_ms - self.begin_ms.max(0.0);
        if local < 0.0 {
            return ClockPosition::BeforeBegin;
        }

        let cycle = self.cycle_ms();
        if cycle <= 0.0 {
            return ClockPosition::Completed {
                progress: self.end_progress(),
                iteration: self.repeat.iterations().unwrap_or(1),
            };
        }

        if let Some(iterations) = self.repeat.iterations() {
            if local >= cycle * iterations as f32 {
                return ClockPosition::Completed {
                    progress: self.end_progress(),
                    iteration: iterations,
                };
            }
        }

        let iteration = (local / cycle).floor();
        let within = local - iteration * cycle;
        let duration = self.duration_ms;
        let progress = if within < duration {
            within / duration
        } else {
            1.0 - (within - duration) / duration
        };
        ClockPosition::Active {
            progress: progress.clamp(0.0, 1.0),
            iteration: iteration as u32,
        }
    }

    /// Apply the speed profile and easing curve to linear progress.
    pub(crate) fn shape(&self, linear: f32) -> Result<f32, AnimationError> {
        let warped = self.speed.warp(linear)?;
        Ok(self.easing.evaluate(warped))
    }
}

/// Drive a single-property run: move its clock and let `apply` write the value
/// for the shaped progress.
pub(crate) fn advance_leaf<F>(
    timing: &Timing,
    state: &mut RunState,
    elapsed_ms: f32,
    mut apply: F,
) -> Result<(), AnimationError>
where
    F: FnMut(&mut RunState, f32) -> Result<(), AnimationError>,
{
    if state.state.is_terminal() {
        return Ok(());
    }
    state.elapsed_ms += elapsed_ms;
    match timing.position(state.elapsed_ms) {
        ClockPosition::BeforeBegin => {
            state.state = AnimationState::Pending;
            Ok(())
        }
        ClockPosition::Active {
            progress,
            iteration,
        } => {
            state.state = AnimationState::Running;
            state.iteration = iteration;
            let shaped = timing.shape(progress)?;
            apply(state, shaped)
        }
        ClockPosition::Completed {
            progress,
            iteration,
        } => {
            state.iteration = iteration;
            let shaped = timing.shape(progress)?;
            apply(state, shaped)?;
            state.state = AnimationState::Finished;
            Ok(())
        }
    }
}

/// Start a single-property run at `t0_ms` and write its initial value.
pub(crate) fn start_leaf<F>(timing: &Timing, state: &mut RunState, t0_ms: f32, apply: F)
where
    F: FnOnce(&mut RunState, f32) -> Result<(), AnimationError>,
{
    state.elapsed_ms = t0_ms.max(0.0);
    state.iteration = 0;
    state.state = match timing.position(state.elapsed_ms) {
        ClockPosition::BeforeBegin => AnimationState::Pending,
        _ => AnimationState::Running,
    };
    // A failure here is reported again by the first advance.
    if let Err(error) = apply(state, 0.0) {
        debug!(target = %state.target, %error, "initial value not applied");
    }
}

/// Commit a single-property run according to its fill behavior.
pub(crate) fn finalize_leaf(timing: &Timing, state: &mut RunState) {
    if state.state == AnimationState::Finished && timing.fill == FillBehavior::Stop {
        state.restore_baseline();
    }
    state.state = AnimationState::Finished;
}

/// Closed set of built-in animation kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Timeline {
    Property(PropertyAnimation),
    Keyframes(KeyframeAnimation),
    Storyboard(Storyboard),
}

impl Timeline {
    /// Share this definition with the scheduler.
    pub fn into_ref(self) -> AnimatableRef {
        Arc::new(self)
    }
}

impl From<PropertyAnimation> for Timeline {
    fn from(animation: PropertyAnimation) -> Self {
        Self::Property(animation)
    }
}

impl From<KeyframeAnimation> for Timeline {
    fn from(animation: KeyframeAnimation) -> Self {
        Self::Keyframes(animation)
    }
}

impl From<Storyboard> for Timeline {
    fn from(storyboard: Storyboard) -> Self {
        Self::Storyboard(storyboard)
    }
}

impl Animatable for Timeline {
    fn name(&self) -> &str {
        match self {
            Self::Property(a) => &a.name,
            Self::Keyframes(a) => &a.name,
            Self::Storyboard(s) => &s.name,
        }
    }

    fn create_run_state(&self, target: &TargetId) -> RunState {
        match self {
            Self::Storyboard(s) => s.create_run_state(target),
            _ => RunState::new(target.clone()),
        }
    }

    fn animated_properties(&self, state: &RunState) -> PropertySet {
        match self {
            Self::Property(a) => std::iter::once(a.key(state)).collect(),
            Self::Keyframes(a) => std::iter::once(a.key(state)).collect(),
            Self::Storyboard(s) => s.animated_properties(state),
        }
    }

    fn setup(&self, state: &mut RunState, baseline: &PropertySnapshot) {
        let animated = self.animated_properties(state);
        state.seed_baseline(baseline, &animated);
        if let Self::Storyboard(s) = self {
            s.setup(state, baseline);
        }
    }

    fn start(&self, state: &mut RunState, t0_ms: f32) {
        match self {
            Self::Property(a) => start_leaf(&a.timing, state, t0_ms, |st, p| a.apply(st, p)),
            Self::Keyframes(a) => start_leaf(&a.timing, state, t0_ms, |st, p| a.apply(st, p)),
            Self::Storyboard(s) => s.start(state, t0_ms),
        }
    }

    fn advance(&self, state: &mut RunState, elapsed_ms: f32) -> Result<(), AnimationError> {
        match self {
            Self::Property(a) => {
                advance_leaf(&a.timing, state, elapsed_ms, |st, p| a.apply(st, p))
            }
            Self::Keyframes(a) => {
                advance_leaf(&a.timing, state, elapsed_ms, |st, p| a.apply(st, p))
            }
            Self::Storyboard(s) => s.advance(state, elapsed_ms),
        }
    }

    fn is_complete(&self, state: &RunState) -> bool {
        state.is_finished()
    }

    fn finalize(&self, state: &mut RunState) -> Result<(), AnimationError> {
        match self {
            Self::Property(a) => {
                finalize_leaf(&a.timing, state);
                Ok(())
            }
            Self::Keyframes(a) => {
                finalize_leaf(&a.timing, state);
                Ok(())
            }
            Self::Storyboard(s) => s.finalize(state),
        }
    }

    fn force_stop(&self, state: &mut RunState) {
        match self {
            Self::Storyboard(s) => s.force_stop(state),
            _ => {
                state.restore_baseline();
                state.state = AnimationState::Cancelled;
            }
        }
    }
}
