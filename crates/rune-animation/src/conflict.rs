//! Property conflict detection between a candidate run and the active set.

use crate::context::AnimationContext;
use crate::run_state::PropertySnapshot;
use crate::types::{AnimationId, PropertySet};

/// Active runs that touch at least one candidate property, with the values
/// they currently hold for the shared properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conflicts {
    /// Conflicting runs, in active-set order.
    pub contexts: Vec<AnimationId>,
    pub values: PropertySnapshot,
}

impl Conflicts {
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

/// Whether two property sets share at least one key.
pub fn properties_overlap(a: &PropertySet, b: &PropertySet) -> bool {
    a.intersection(b).next().is_some()
}

/// Scan `active` for runs sharing a property with `candidate`. A later run
/// overwrites an earlier one's value for the same key.
pub fn find_conflicts(candidate: &PropertySet, active: &[AnimationContext]) -> Conflicts {
    let mut conflicts = Conflicts::default();
    if candidate.is_empty() {
        return conflicts;
    }

    for ctx in active {
        let touched = ctx.animated_properties();
        let mut shared = candidate.intersection(&touched).peekable();
        if shared.peek().is_none() {
            continue;
        }
        conflicts.contexts.push(ctx.id);
        for key in shared {
            if let Some(value) = ctx.animatable.current_value(&ctx.run_state, key) {
                conflicts.values.set(key.clone(), value);
            }
        }
    }
    conflicts
}
