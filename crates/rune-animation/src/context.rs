//! Scheduler-side record of one animation run.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::animatable::{AnimatableRef, same_animatable};
use crate::run_state::RunState;
use crate::types::{AnimationId, HandoffBehavior, PropertySet, TargetId};

/// Identity of a run in the active set: the animation definition's allocation
/// plus the target it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey {
    animatable: usize,
    pub target: TargetId,
}

impl ContextKey {
    pub fn new(animatable: &AnimatableRef, target: &TargetId) -> Self {
        Self {
            animatable: Arc::as_ptr(animatable) as *const () as usize,
            target: target.clone(),
        }
    }
}

/// An animation run owned by the scheduler.
///
/// The run state is created when the run starts and dropped when the context
/// leaves the active set. `waiting_for` only shrinks after registration.
pub struct AnimationContext {
    pub(crate) id: AnimationId,
    pub(crate) animatable: AnimatableRef,
    pub(crate) run_state: RunState,
    pub(crate) target: TargetId,
    pub(crate) waiting_for: HashSet<AnimationId>,
    pub(crate) handoff: HandoffBehavior,
}

impl AnimationContext {
    /// Create a context with a fresh run state bound to `target`.
    pub fn new(animatable: AnimatableRef, target: TargetId, handoff: HandoffBehavior) -> Self {
        let run_state = animatable.create_run_state(&target);
        Self {
            id: AnimationId::new(),
            animatable,
            run_state,
            target,
            waiting_for: HashSet::new(),
            handoff,
        }
    }

    pub fn id(&self) -> AnimationId {
        self.id
    }

    pub fn animatable(&self) -> &AnimatableRef {
        &self.animatable
    }

    pub fn name(&self) -> &str {
        self.animatable.name()
    }

    pub fn run_state(&self) -> &RunState {
        &self.run_state
    }

    pub fn target(&self) -> &TargetId {
        &self.target
    }

    pub fn waiting_for(&self) -> &HashSet<AnimationId> {
        &self.waiting_for
    }

    pub fn is_waiting(&self) -> bool {
        !self.waiting_for.is_empty()
    }

    pub fn handoff(&self) -> HandoffBehavior {
        self.handoff
    }

    pub fn key(&self) -> ContextKey {
        ContextKey::new(&self.animatable, &self.target)
    }

    /// Whether this run executes `animatable` against `target`.
    pub fn matches(&self, animatable: &AnimatableRef, target: &TargetId) -> bool {
        self.target == *target && same_animatable(&self.animatable, animatable)
    }

    pub fn animated_properties(&self) -> PropertySet {
        self.animatable.animated_properties(&self.run_state)
    }

    /// Drop wait entries whose run is no longer active.
    pub(crate) fn prune_waits(&mut self, is_active: impl Fn(AnimationId) -> bool) {
        self.waiting_for.retain(|id| is_active(*id));
    }
}

impl fmt::Debug for AnimationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationContext")
            .field("id", &self.id)
            .field("name", &self.animatable.name())
            .field("target", &self.target)
            .field("state", &self.run_state.state)
            .field("waiting_for", &self.waiting_for)
            .field("handoff", &self.handoff)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyAnimation;
    use crate::timeline::Timeline;
    use crate::types::AnimatableProperty;

    fn fade() -> AnimatableRef {
        Timeline::from(PropertyAnimation::new("fade", AnimatableProperty::Opacity, 1.0))
            .into_ref()
    }

    #[test]
    fn test_key_uses_pointer_identity() {
        let a = fade();
        let b = fade();
        let target = TargetId::new("n");

        let ctx = AnimationContext::new(a.clone(), target.clone(), HandoffBehavior::Compose);
        assert_eq!(ctx.key(), ContextKey::new(&a, &target));
        assert_ne!(ctx.key(), ContextKey::new(&b, &target));
        assert!(ctx.matches(&a, &target));
        assert!(!ctx.matches(&b, &target));
        assert!(!ctx.matches(&a, &TargetId::new("other")));
    }

    #[test]
    fn test_prune_waits() {
        let mut ctx = AnimationContext::new(fade(), TargetId::new("n"), HandoffBehavior::Compose);
        ctx.waiting_for.insert(AnimationId(1));
        ctx.waiting_for.insert(AnimationId(2));

        ctx.prune_waits(|id| id == AnimationId(2));
        assert_eq!(ctx.waiting_for().len(), 1);
        assert!(ctx.is_waiting());

        ctx.prune_waits(|_| false);
        assert!(!ctx.is_waiting());
    }

    #[test]
    fn test_run_state_bound_to_target() {
        let ctx = AnimationContext::new(fade(), TargetId::new("n"), HandoffBehavior::default());
        assert_eq!(ctx.run_state().target.as_str(), "n");
        assert_eq!(ctx.animated_properties().len(), 1);
    }
}
