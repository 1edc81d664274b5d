//! The animation scheduler.
//!
//! The `Animator` owns every running animation, resolves property conflicts
//! when a new one starts and advances the runs that are not blocked once per
//! tick. It handles:
//! - Starting runs under a handoff behavior (compose, temporary replace,
//!   snapshot and replace)
//! - Stopping runs by definition and target, by target, or all at once
//! - Advancing eligible runs and finalizing the ones that complete
//! - Delivering committed values and lifecycle events to its owner
//!
//! # Usage
//!
//! ```
//! use rune_animation::{Animator, HandoffBehavior, PropertyAnimation, Timeline, Timing};
//! use rune_animation::types::AnimatableProperty;
//!
//! let mut animator = Animator::new();
//! let fade = Timeline::from(
//!     PropertyAnimation::new("fade", AnimatableProperty::Opacity, 1.0)
//!         .from(0.0)
//!         .timing(Timing::with_duration(100.0)),
//! )
//! .into_ref();
//!
//! animator.start(fade, "button", HandoffBehavior::SnapshotAndReplace);
//! animator.advance(50.0).unwrap();
//! animator.advance(50.0).unwrap();
//!
//! // The committed end value waits for the owner to apply it.
//! let values = animator.take_pending_values();
//! assert_eq!(values.len(), 1);
//! assert!(!animator.has_active_animations());
//! ```

use std::collections::{HashMap, HashSet};

use rune_config::AnimationConfig;
use tracing::{debug, trace, warn};

use crate::animatable::AnimatableRef;
use crate::conflict::find_conflicts;
use crate::context::{AnimationContext, ContextKey};
use crate::error::{AnimationError, AnimatorError, ContextFailure, Result};
use crate::events::{AnimatorEvent, EventQueue};
use crate::run_state::PropertySnapshot;
use crate::types::{
    AnimatableProperty, AnimatableValue, AnimationId, HandoffBehavior, PropertyKey, TargetId,
};

/// What happened to the active set during one `advance` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// Runs advanced this tick, in active-set order.
    pub advanced: Vec<AnimationId>,
    /// Runs skipped because they were waiting on another run.
    pub blocked: Vec<AnimationId>,
    /// Runs that completed, committed and left the active set.
    pub finished: Vec<AnimationId>,
    /// Runs evicted because their animation failed.
    pub failed: Vec<AnimationId>,
}

impl TickSummary {
    pub fn is_idle(&self) -> bool {
        self.advanced.is_empty() && self.blocked.is_empty()
    }
}

/// Scheduler for all running animations.
///
/// Thread safety: `Animator` is `Send`; share it through
/// [`AnimatorHandle`](crate::AnimatorHandle) when the control and tick roles
/// live on different threads.
#[derive(Debug)]
pub struct Animator {
    /// Active runs in start order.
    active: Vec<AnimationContext>,

    /// Values waiting for the owner to apply them.
    pending_values: PropertySnapshot,

    /// Lifecycle events emitted by start, stop and advance.
    event_queue: EventQueue,

    /// Handoff used by `start_default`.
    default_handoff: HandoffBehavior,

    /// Panic when a scheduling invariant is violated.
    strict_invariants: bool,

    /// Emit per-tick trace logs.
    trace_ticks: bool,
}

impl Default for Animator {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            pending_values: PropertySnapshot::new(),
            event_queue: EventQueue::new(),
            default_handoff: HandoffBehavior::default(),
            strict_invariants: cfg!(debug_assertions),
            trace_ticks: false,
        }
    }
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scheduler from configuration. An unknown default handoff name
    /// or an event queue that can hold nothing is rejected.
    pub fn with_config(config: &AnimationConfig) -> Result<Self> {
        let default_handoff: HandoffBehavior = config.default_handoff.parse()?;
        if config.max_queued_events == Some(0) {
            return Err(AnimatorError::Config(
                "max_queued_events must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            active: Vec::new(),
            pending_values: PropertySnapshot::new(),
            event_queue: EventQueue::with_limit(config.max_queued_events),
            default_handoff,
            strict_invariants: config.strict_invariants,
            trace_ticks: config.trace_ticks,
        })
    }

    pub fn default_handoff(&self) -> HandoffBehavior {
        self.default_handoff
    }

    pub fn set_default_handoff(&mut self, handoff: HandoffBehavior) {
        self.default_handoff = handoff;
    }

    pub fn set_strict_invariants(&mut self, strict: bool) {
        self.strict_invariants = strict;
    }

    // ========================================================================
    // Start / Stop
    // ========================================================================

    /// Start `animatable` against `target`.
    ///
    /// Active runs sharing a property with the new run are handed off:
    /// - `Compose`: the new run waits until every conflicting run is gone.
    /// - `TemporaryReplace`: every conflicting run waits until the new run is gone.
    /// - `SnapshotAndReplace`: every conflicting run commits its current values
    ///   and is evicted before this returns.
    ///
    /// The new run's baseline is seeded with the values the conflicting runs
    /// (and any pending values) held for its properties.
    pub fn start(
        &mut self,
        animatable: AnimatableRef,
        target: impl Into<TargetId>,
        handoff: HandoffBehavior,
    ) -> AnimationId {
        let mut ctx = AnimationContext::new(animatable, target.into(), handoff);
        let id = ctx.id;
        let properties = ctx.animated_properties();

        if properties.is_empty() {
            let key = ctx.key();
            let same_key: Vec<AnimationId> = self
                .active
                .iter()
                .filter(|c| c.key() == key)
                .map(|c| c.id)
                .collect();
            for old in same_key {
                if let Some(old_ctx) = self.take_context(old) {
                    debug!(
                        animation_id = %old,
                        replaced_by = %id,
                        "restarting animation without properties"
                    );
                    self.evict_stopped(old_ctx);
                }
            }
        }

        let mut baseline = PropertySnapshot::new();
        for key in &properties {
            if let Some(value) = self.pending_values.remove(key) {
                baseline.set(key.clone(), value);
            }
        }
        let conflicts = find_conflicts(&properties, &self.active);
        baseline.merge(&conflicts.values);

        if !conflicts.is_empty() {
            debug!(
                animation_id = %id,
                target = %ctx.target,
                %handoff,
                conflicts = conflicts.contexts.len(),
                "handing off conflicting animations"
            );
        }

        match handoff {
            HandoffBehavior::Compose => {
                ctx.waiting_for.extend(conflicts.contexts.iter().copied());
            }
            HandoffBehavior::TemporaryReplace => {
                for existing in self
                    .active
                    .iter_mut()
                    .filter(|c| conflicts.contexts.contains(&c.id))
                {
                    existing.waiting_for.insert(id);
                }
            }
            HandoffBehavior::SnapshotAndReplace => {
                for old in &conflicts.contexts {
                    if let Some(old_ctx) = self.take_context(*old) {
                        self.evict_replaced(old_ctx, id);
                    }
                }
                // The new run owns these properties from here on.
                for key in &properties {
                    self.pending_values.remove(key);
                }
            }
        }

        ctx.animatable.setup(&mut ctx.run_state, &baseline);
        ctx.animatable.start(&mut ctx.run_state, 0.0);

        debug!(
            animation_id = %id,
            name = ctx.name(),
            target = %ctx.target,
            %handoff,
            waiting = ctx.waiting_for.len(),
            "animation started"
        );
        self.event_queue.push(AnimatorEvent::Started {
            animation_id: id,
            target: ctx.target.clone(),
            name: ctx.name().to_string(),
        });
        self.active.push(ctx);
        self.check_invariants();
        id
    }

    /// Start with the configured default handoff.
    pub fn start_default(
        &mut self,
        animatable: AnimatableRef,
        target: impl Into<TargetId>,
    ) -> AnimationId {
        let handoff = self.default_handoff;
        self.start(animatable, target, handoff)
    }

    /// Start with a handoff given by name, e.g. from scene data.
    pub fn start_named(
        &mut self,
        animatable: AnimatableRef,
        target: impl Into<TargetId>,
        handoff: &str,
    ) -> Result<AnimationId> {
        let handoff: HandoffBehavior = handoff.parse()?;
        Ok(self.start(animatable, target, handoff))
    }

    /// Force-stop every run of `animatable` bound to `target`.
    ///
    /// Stopped runs do not commit; their baseline values are queued instead.
    /// Returns `false` when nothing matched.
    pub fn stop(&mut self, animatable: &AnimatableRef, target: &TargetId) -> bool {
        let matching: Vec<AnimationId> = self
            .active
            .iter()
            .filter(|c| c.matches(animatable, target))
            .map(|c| c.id)
            .collect();
        self.stop_ids(&matching)
    }

    /// Force-stop every run bound to `target`. Returns how many were stopped.
    pub fn stop_all_for_target(&mut self, target: &TargetId) -> usize {
        let matching: Vec<AnimationId> = self
            .active
            .iter()
            .filter(|c| c.target == *target)
            .map(|c| c.id)
            .collect();
        self.stop_ids(&matching);
        matching.len()
    }

    /// Force-stop every run.
    pub fn stop_all(&mut self) {
        let all = std::mem::take(&mut self.active);
        if !all.is_empty() {
            debug!(count = all.len(), "stopping all animations");
        }
        for ctx in all {
            self.evict_stopped(ctx);
        }
    }

    fn stop_ids(&mut self, ids: &[AnimationId]) -> bool {
        let mut stopped = false;
        for id in ids {
            if let Some(ctx) = self.take_context(*id) {
                self.evict_stopped(ctx);
                stopped = true;
            }
        }
        if stopped {
            self.check_invariants();
        }
        stopped
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance every run that is not waiting by `delta_ms`.
    ///
    /// Wait sets are pruned and eligibility is decided for all runs before any
    /// run advances, so a run that completes during this tick unblocks its
    /// waiters on the next tick. Completed runs are finalized and evicted after
    /// every eligible run has advanced.
    ///
    /// A run whose animation fails is evicted without affecting the others;
    /// the failures of the tick are reported together once bookkeeping is done.
    pub fn advance(&mut self, delta_ms: f32) -> Result<TickSummary> {
        if !delta_ms.is_finite() || delta_ms < 0.0 {
            return Err(AnimatorError::InvalidElapsed(delta_ms));
        }

        let active_ids: HashSet<AnimationId> = self.active.iter().map(|c| c.id).collect();
        for ctx in &mut self.active {
            ctx.prune_waits(|id| active_ids.contains(&id));
        }
        let eligible: Vec<bool> = self.active.iter().map(|c| !c.is_waiting()).collect();

        let mut summary = TickSummary::default();
        let mut completed = Vec::new();
        let mut errored: Vec<(AnimationId, AnimationError)> = Vec::new();

        for (ctx, eligible) in self.active.iter_mut().zip(eligible) {
            if !eligible {
                summary.blocked.push(ctx.id);
                continue;
            }
            match ctx.animatable.advance(&mut ctx.run_state, delta_ms) {
                Ok(()) => {
                    summary.advanced.push(ctx.id);
                    if ctx.animatable.is_complete(&ctx.run_state) {
                        completed.push(ctx.id);
                    }
                }
                Err(error) => errored.push((ctx.id, error)),
            }
        }

        if self.trace_ticks {
            trace!(
                delta_ms,
                advanced = summary.advanced.len(),
                blocked = summary.blocked.len(),
                completed = completed.len(),
                failed = errored.len(),
                "tick"
            );
        }
        if summary.advanced.is_empty() && errored.is_empty() && !summary.blocked.is_empty() {
            warn!(
                blocked = summary.blocked.len(),
                "every active animation is waiting on another"
            );
        }

        let mut failures = Vec::new();
        for (id, error) in errored {
            if let Some(ctx) = self.take_context(id) {
                failures.push(self.evict_failed(ctx, error));
                summary.failed.push(id);
            }
        }

        for id in completed {
            let Some(ctx) = self.take_context(id) else {
                continue;
            };
            match self.evict_finished(ctx) {
                Ok(()) => summary.finished.push(id),
                Err(failure) => {
                    summary.failed.push(id);
                    failures.push(failure);
                }
            }
        }

        self.check_invariants();

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(AnimatorError::AnimationsFailed { failures })
        }
    }

    // ========================================================================
    // Eviction
    // ========================================================================

    fn take_context(&mut self, id: AnimationId) -> Option<AnimationContext> {
        let index = self.active.iter().position(|c| c.id == id)?;
        Some(self.active.remove(index))
    }

    fn evict_stopped(&mut self, mut ctx: AnimationContext) {
        ctx.animatable.force_stop(&mut ctx.run_state);
        self.pending_values.merge(&ctx.run_state.values);
        debug!(animation_id = %ctx.id, target = %ctx.target, "animation stopped");
        self.event_queue.push(AnimatorEvent::Stopped {
            animation_id: ctx.id,
            target: ctx.target.clone(),
            name: ctx.name().to_string(),
        });
    }

    fn evict_failed(
        &mut self,
        mut ctx: AnimationContext,
        error: AnimationError,
    ) -> ContextFailure {
        ctx.animatable.force_stop(&mut ctx.run_state);
        self.pending_values.merge(&ctx.run_state.values);
        warn!(
            animation_id = %ctx.id,
            name = ctx.name(),
            target = %ctx.target,
            %error,
            "animation failed, evicting"
        );
        self.event_queue.push(AnimatorEvent::Failed {
            animation_id: ctx.id,
            target: ctx.target.clone(),
            name: ctx.name().to_string(),
            error: error.to_string(),
        });
        ContextFailure {
            animation_id: ctx.id,
            target: ctx.target.clone(),
            name: ctx.name().to_string(),
            error,
        }
    }

    fn evict_finished(
        &mut self,
        mut ctx: AnimationContext,
    ) -> std::result::Result<(), ContextFailure> {
        if let Err(error) = ctx.animatable.finalize(&mut ctx.run_state) {
            return Err(self.evict_failed(ctx, error));
        }
        self.pending_values.merge(&ctx.run_state.values);
        debug!(animation_id = %ctx.id, target = %ctx.target, "animation finished");
        self.event_queue.push(AnimatorEvent::Finished {
            animation_id: ctx.id,
            target: ctx.target.clone(),
            name: ctx.name().to_string(),
            committed: ctx.run_state.values.clone().into_sorted_vec(),
        });
        Ok(())
    }

    fn evict_replaced(&mut self, mut ctx: AnimationContext, by: AnimationId) {
        if let Err(error) = ctx.animatable.finalize(&mut ctx.run_state) {
            // Start has no error channel; the failure travels as an event.
            self.evict_failed(ctx, error);
            return;
        }
        self.pending_values.merge(&ctx.run_state.values);
        debug!(animation_id = %ctx.id, replaced_by = %by, "animation replaced");
        self.event_queue.push(AnimatorEvent::Replaced {
            animation_id: ctx.id,
            target: ctx.target.clone(),
            name: ctx.name().to_string(),
            by,
        });
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn contains(&self, id: AnimationId) -> bool {
        self.active.iter().any(|c| c.id == id)
    }

    pub fn context(&self, id: AnimationId) -> Option<&AnimationContext> {
        self.active.iter().find(|c| c.id == id)
    }

    /// Active runs in start order.
    pub fn contexts(&self) -> impl Iterator<Item = &AnimationContext> {
        self.active.iter()
    }

    /// Raw wait set of a run. Entries for runs that already left the active
    /// set are pruned on the next tick.
    pub fn waiting_for(&self, id: AnimationId) -> Option<&HashSet<AnimationId>> {
        self.context(id).map(|c| &c.waiting_for)
    }

    /// Whether the run is blocked on a run that is still active.
    pub fn is_waiting(&self, id: AnimationId) -> bool {
        self.context(id).is_some_and(|c| self.is_blocked(c))
    }

    fn is_blocked(&self, ctx: &AnimationContext) -> bool {
        ctx.waiting_for.iter().any(|id| self.contains(*id))
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn has_active_animations(&self) -> bool {
        !self.active.is_empty()
    }

    /// Current value of `property` on `target` from the most recently started
    /// run that animates it and is not waiting.
    pub fn animated_value(
        &self,
        target: &TargetId,
        property: AnimatableProperty,
    ) -> Option<AnimatableValue> {
        let key = PropertyKey::new(target, property);
        self.active
            .iter()
            .rev()
            .filter(|c| !self.is_blocked(c))
            .find(|c| c.animated_properties().contains(&key))
            .and_then(|c| c.animatable.current_value(&c.run_state, &key))
    }

    // ========================================================================
    // Pending values
    // ========================================================================

    /// Schedule `value` for the owner to apply, replacing any scheduled value.
    pub fn set_value(&mut self, key: PropertyKey, value: AnimatableValue) {
        self.pending_values.set(key, value);
    }

    pub fn pending_value(&self, key: &PropertyKey) -> Option<&AnimatableValue> {
        self.pending_values.get(key)
    }

    pub fn has_pending_values(&self) -> bool {
        !self.pending_values.is_empty()
    }

    /// Hand every scheduled value to the owner.
    pub fn take_pending_values(&mut self) -> PropertySnapshot {
        std::mem::take(&mut self.pending_values)
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn drain_events(&mut self) -> impl Iterator<Item = AnimatorEvent> + '_ {
        self.event_queue.drain()
    }

    pub fn pop_event(&mut self) -> Option<AnimatorEvent> {
        self.event_queue.pop()
    }

    pub fn peek_event(&self) -> Option<&AnimatorEvent> {
        self.event_queue.peek()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    pub fn pending_event_count(&self) -> usize {
        self.event_queue.len()
    }

    pub fn events_for_target(&self, target: &TargetId) -> Vec<&AnimatorEvent> {
        self.event_queue.events_for_target(target)
    }

    pub fn clear_events(&mut self) {
        self.event_queue.clear();
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Check the active set and its wait graph:
    /// - ids are unique
    /// - no run waits on itself
    /// - the wait graph between active runs has no cycle
    /// - two runs of the same animation on the same target are linked by a wait
    pub fn verify_invariants(&self) -> std::result::Result<(), String> {
        let mut ids = HashSet::new();
        for ctx in &self.active {
            if !ids.insert(ctx.id) {
                return Err(format!("duplicate animation id {}", ctx.id));
            }
            if ctx.waiting_for.contains(&ctx.id) {
                return Err(format!("animation {} waits on itself", ctx.id));
            }
        }

        let mut by_key: HashMap<ContextKey, Vec<&AnimationContext>> = HashMap::new();
        for ctx in &self.active {
            by_key.entry(ctx.key()).or_default().push(ctx);
        }
        for runs in by_key.values() {
            for (i, a) in runs.iter().enumerate() {
                for b in &runs[i + 1..] {
                    if !a.waiting_for.contains(&b.id) && !b.waiting_for.contains(&a.id) {
                        return Err(format!(
                            "runs {} and {} of the same animation on {} are not ordered",
                            a.id, b.id, a.target
                        ));
                    }
                }
            }
        }

        if let Some(id) = self.find_wait_cycle() {
            return Err(format!("wait cycle through animation {id}"));
        }
        Ok(())
    }

    fn find_wait_cycle(&self) -> Option<AnimationId> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        let edges: HashMap<AnimationId, &HashSet<AnimationId>> =
            self.active.iter().map(|c| (c.id, &c.waiting_for)).collect();
        let mut marks: HashMap<AnimationId, Mark> = HashMap::new();

        for ctx in &self.active {
            if marks.contains_key(&ctx.id) {
                continue;
            }
            // Iterative DFS; the second tuple field is set once children are pushed.
            let mut stack = vec![(ctx.id, false)];
            while let Some((id, expanded)) = stack.pop() {
                if expanded {
                    marks.insert(id, Mark::Done);
                    continue;
                }
                match marks.get(&id) {
                    Some(Mark::Done) => continue,
                    Some(Mark::Visiting) => continue,
                    None => {}
                }
                marks.insert(id, Mark::Visiting);
                stack.push((id, true));
                for next in edges.get(&id).into_iter().flat_map(|set| set.iter()) {
                    if !edges.contains_key(next) {
                        continue;
                    }
                    match marks.get(next) {
                        Some(Mark::Visiting) => return Some(*next),
                        Some(Mark::Done) => {}
                        None => stack.push((*next, false)),
                    }
                }
            }
        }
        None
    }

    fn check_invariants(&self) {
        if !self.strict_invariants {
            return;
        }
        if let Err(violation) = self.verify_invariants() {
            panic!("animator invariant violated: {violation}");
        }
    }
}

static_assertions::assert_impl_all!(Animator: Send);
