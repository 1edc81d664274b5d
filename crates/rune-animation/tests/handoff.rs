mod common;

use std::collections::HashSet;

use anyhow::Result;
use common::{Probe, as_ref, key};
use rune_animation::{AnimatableProperty, Animator, AnimatorEvent, HandoffBehavior, TargetId};

const OPACITY: AnimatableProperty = AnimatableProperty::Opacity;
const WIDTH: AnimatableProperty = AnimatableProperty::Width;
const HEIGHT: AnimatableProperty = AnimatableProperty::Height;

#[test]
fn compose_waits_for_every_predecessor() -> Result<()> {
    let mut animator = Animator::new();
    let b = Probe::new("b", &[OPACITY], 20.0);
    let c = Probe::new("c", &[WIDTH], 40.0);
    let a = Probe::new("a", &[OPACITY, WIDTH], 100.0);

    let b_id = animator.start(as_ref(&b), "n", HandoffBehavior::Compose);
    let c_id = animator.start(as_ref(&c), "n", HandoffBehavior::Compose);
    let a_id = animator.start(as_ref(&a), "n", HandoffBehavior::Compose);

    let expected: HashSet<_> = [b_id, c_id].into_iter().collect();
    assert_eq!(animator.waiting_for(a_id), Some(&expected));
    assert!(animator.waiting_for(b_id).is_some_and(|w| w.is_empty()));

    // b completes on the second tick, c on the fourth.
    for _ in 0..4 {
        animator.advance(10.0)?;
        assert_eq!(a.advances(), 0);
    }
    assert!(!animator.contains(b_id));
    assert!(!animator.contains(c_id));

    let summary = animator.advance(10.0)?;
    assert_eq!(summary.advanced, vec![a_id]);
    assert_eq!(a.advances(), 1);
    Ok(())
}

#[test]
fn compose_unblocks_after_predecessor_is_stopped() -> Result<()> {
    let mut animator = Animator::new();
    let b = Probe::new("b", &[OPACITY], 1000.0);
    let a = Probe::new("a", &[OPACITY], 1000.0);

    animator.start(as_ref(&b), "n", HandoffBehavior::Compose);
    let a_id = animator.start(as_ref(&a), "n", HandoffBehavior::Compose);
    animator.advance(10.0)?;
    assert_eq!(a.advances(), 0);

    assert!(animator.stop(&as_ref(&b), &TargetId::new("n")));
    assert!(!animator.is_waiting(a_id));

    animator.advance(10.0)?;
    assert_eq!(a.advances(), 1);
    Ok(())
}

#[test]
fn temporary_replace_pauses_and_resumes_predecessor() -> Result<()> {
    let mut animator = Animator::new();
    let b = Probe::new("b", &[OPACITY], 100.0);
    let a = Probe::new("a", &[OPACITY], 20.0);

    let b_id = animator.start(as_ref(&b), "n", HandoffBehavior::Compose);
    animator.advance(10.0)?;
    assert_eq!(b.advances(), 1);

    let a_id = animator.start(as_ref(&a), "n", HandoffBehavior::TemporaryReplace);
    assert!(animator.waiting_for(b_id).is_some_and(|w| w.contains(&a_id)));
    assert!(animator.waiting_for(a_id).is_some_and(|w| w.is_empty()));

    // a runs for two ticks and leaves; b sits out the tick a completes on.
    animator.advance(10.0)?;
    animator.advance(10.0)?;
    assert!(!animator.contains(a_id));
    assert_eq!(b.advances(), 1);

    animator.advance(10.0)?;
    assert_eq!(b.advances(), 2);
    assert!(!animator.is_waiting(b_id));

    // b resumed its own clock, it did not restart.
    let value = animator.animated_value(&TargetId::new("n"), OPACITY);
    assert_eq!(value.and_then(|v| v.as_f64()), Some(20.0));
    Ok(())
}

#[test]
fn nested_temporary_replace_unwinds_in_order() -> Result<()> {
    let mut animator = Animator::new();
    let base = Probe::new("base", &[OPACITY], 1000.0);
    let first = Probe::new("first", &[OPACITY], 30.0);
    let second = Probe::new("second", &[OPACITY], 10.0);

    let base_id = animator.start(as_ref(&base), "n", HandoffBehavior::Compose);
    let first_id = animator.start(as_ref(&first), "n", HandoffBehavior::TemporaryReplace);
    let second_id = animator.start(as_ref(&second), "n", HandoffBehavior::TemporaryReplace);

    assert!(animator.is_waiting(base_id));
    assert!(animator.waiting_for(first_id).is_some_and(|w| w.contains(&second_id)));
    assert!(animator.verify_invariants().is_ok());

    animator.advance(10.0)?;
    assert_eq!(second.advances(), 1);
    assert_eq!((first.advances(), base.advances()), (0, 0));
    assert!(!animator.contains(second_id));

    // first resumes while base still waits on it.
    animator.advance(10.0)?;
    assert_eq!(first.advances(), 1);
    assert_eq!(base.advances(), 0);

    animator.advance(10.0)?;
    animator.advance(10.0)?;
    assert!(!animator.contains(first_id));
    assert_eq!(base.advances(), 0);

    animator.advance(10.0)?;
    assert_eq!(base.advances(), 1);
    Ok(())
}

#[test]
fn snapshot_and_replace_evicts_immediately() -> Result<()> {
    let mut animator = Animator::new();
    let b = Probe::new("b", &[OPACITY], 100.0);
    let a = Probe::new("a", &[OPACITY], 100.0);

    let b_id = animator.start(as_ref(&b), "n", HandoffBehavior::Compose);
    animator.advance(30.0)?;
    animator.clear_events();

    let a_id = animator.start(as_ref(&a), "n", HandoffBehavior::SnapshotAndReplace);
    assert!(!animator.contains(b_id));
    assert_eq!(animator.active_count(), 1);
    assert!(animator.waiting_for(a_id).is_some_and(|w| w.is_empty()));

    // The replaced value seeds the new run instead of reaching the owner.
    let opacity = key("n", OPACITY);
    let baseline = animator
        .context(a_id)
        .and_then(|ctx| ctx.run_state().baseline.get(&opacity))
        .and_then(|v| v.as_f64());
    assert_eq!(baseline, Some(30.0));
    assert!(animator.pending_value(&opacity).is_none());

    let events: Vec<_> = animator.drain_events().collect();
    assert!(matches!(
        &events[0],
        AnimatorEvent::Replaced { animation_id, by, .. } if *animation_id == b_id && *by == a_id
    ));
    assert!(events[1].is_started());

    animator.advance(10.0)?;
    animator.advance(10.0)?;
    assert_eq!(b.advances(), 1);
    assert_eq!(a.advances(), 2);
    Ok(())
}

#[test]
fn snapshot_and_replace_survives_finalize_failure() -> Result<()> {
    let mut animator = Animator::new();
    let b = Probe::failing_finalize("b", &[OPACITY], 100.0);
    let a = Probe::new("a", &[OPACITY], 100.0);

    let b_id = animator.start(as_ref(&b), "n", HandoffBehavior::Compose);
    animator.advance(30.0)?;
    animator.clear_events();

    let a_id = animator.start(as_ref(&a), "n", HandoffBehavior::SnapshotAndReplace);
    assert!(!animator.contains(b_id));
    assert!(animator.contains(a_id));
    assert!(!animator.is_waiting(a_id));

    let events: Vec<_> = animator.drain_events().collect();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        AnimatorEvent::Failed { animation_id, error, .. }
            if *animation_id == b_id && error.contains("could not commit")
    ));
    assert!(events[1].is_started() && events[1].animation_id() == a_id);

    // The new run still takes over from where b got to.
    let baseline = animator
        .context(a_id)
        .and_then(|ctx| ctx.run_state().baseline.get(&key("n", OPACITY)))
        .and_then(|v| v.as_f64());
    assert_eq!(baseline, Some(30.0));

    animator.advance(10.0)?;
    assert_eq!((a.advances(), b.advances()), (1, 1));
    Ok(())
}

#[test]
fn overlapping_compose_scenario() -> Result<()> {
    let mut animator = Animator::new();
    let a = Probe::new("a", &[WIDTH, HEIGHT], 20.0);
    let b = Probe::new("b", &[HEIGHT, OPACITY], 50.0);

    let a_id = animator.start(as_ref(&a), "n", HandoffBehavior::Compose);
    let b_id = animator.start(as_ref(&b), "n", HandoffBehavior::Compose);
    let expected: HashSet<_> = [a_id].into_iter().collect();
    assert_eq!(animator.waiting_for(b_id), Some(&expected));

    animator.advance(10.0)?;
    assert_eq!(b.advances(), 0);

    let summary = animator.advance(10.0)?;
    assert_eq!(summary.finished, vec![a_id]);
    assert_eq!(summary.blocked, vec![b_id]);
    assert_eq!(b.advances(), 0);

    let summary = animator.advance(10.0)?;
    assert_eq!(summary.advanced, vec![b_id]);
    assert_eq!(b.advances(), 1);
    Ok(())
}

#[test]
fn disjoint_properties_never_wait() -> Result<()> {
    let mut animator = Animator::new();
    let a = Probe::new("a", &[WIDTH], 100.0);
    let b = Probe::new("b", &[OPACITY], 100.0);
    let c = Probe::new("c", &[WIDTH], 100.0);

    let a_id = animator.start(as_ref(&a), "n", HandoffBehavior::Compose);
    for handoff in [
        HandoffBehavior::Compose,
        HandoffBehavior::TemporaryReplace,
        HandoffBehavior::SnapshotAndReplace,
    ] {
        let id = animator.start(as_ref(&b), "n", handoff);
        assert!(!animator.is_waiting(id));
        assert!(!animator.is_waiting(a_id));
        assert!(animator.contains(a_id));
        animator.stop(&as_ref(&b), &TargetId::new("n"));
    }

    // Same property on another target is not a conflict either.
    let other = animator.start(as_ref(&c), "m", HandoffBehavior::Compose);
    assert!(!animator.is_waiting(other));

    animator.advance(10.0)?;
    assert_eq!((a.advances(), c.advances()), (1, 1));
    Ok(())
}

#[test]
fn wait_sets_only_shrink_between_starts() -> Result<()> {
    let mut animator = Animator::new();
    let a = Probe::new("a", &[OPACITY], 10.0);
    let b = Probe::new("b", &[WIDTH], 30.0);
    let c = Probe::new("c", &[OPACITY, WIDTH], 10.0);

    animator.start(as_ref(&a), "n", HandoffBehavior::Compose);
    animator.start(as_ref(&b), "n", HandoffBehavior::Compose);
    let c_id = animator.start(as_ref(&c), "n", HandoffBehavior::Compose);

    let mut previous = animator.waiting_for(c_id).cloned().unwrap_or_default();
    assert_eq!(previous.len(), 2);
    while animator.contains(c_id) {
        animator.advance(10.0)?;
        let Some(current) = animator.waiting_for(c_id).cloned() else {
            break;
        };
        assert!(current.is_subset(&previous));
        previous = current;
    }
    assert!(!animator.contains(c_id));
    assert_eq!(c.advances(), 1);
    Ok(())
}

#[test]
fn stop_is_idempotent() -> Result<()> {
    let mut animator = Animator::new();
    let a = Probe::new("a", &[OPACITY], 100.0);
    let never = Probe::new("never", &[OPACITY], 100.0);
    let target = TargetId::new("n");

    animator.start(as_ref(&a), "n", HandoffBehavior::Compose);
    animator.advance(10.0)?;

    assert!(animator.stop(&as_ref(&a), &target));
    let events = animator.pending_event_count();
    let pending = animator.has_pending_values();

    assert!(!animator.stop(&as_ref(&a), &target));
    assert!(!animator.stop(&as_ref(&never), &target));
    assert_eq!(animator.pending_event_count(), events);
    assert_eq!(animator.has_pending_values(), pending);
    assert!(!animator.has_active_animations());
    Ok(())
}

#[test]
fn stop_targets_only_the_matching_run() -> Result<()> {
    let mut animator = Animator::new();
    let a = Probe::new("a", &[OPACITY], 100.0);

    animator.start(as_ref(&a), "n", HandoffBehavior::Compose);
    animator.start(as_ref(&a), "m", HandoffBehavior::Compose);

    assert!(animator.stop(&as_ref(&a), &TargetId::new("n")));
    assert_eq!(animator.active_count(), 1);
    assert!(animator.contexts().all(|ctx| ctx.target().as_str() == "m"));
    Ok(())
}
