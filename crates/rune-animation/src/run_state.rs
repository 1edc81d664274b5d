//! Per-run execution state.
//!
//! A `RunState` is the live instantiation of an animation against one target.
//! The same animation definition can run against several targets at once; each
//! run owns its own clock and values.

use std::collections::HashMap;

use crate::types::{AnimatableValue, AnimationState, PropertyKey, PropertySet, TargetId};

/// A snapshot of property values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySnapshot {
    pub values: HashMap<PropertyKey, AnimatableValue>,
}

impl PropertySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: HashMap<PropertyKey, AnimatableValue>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, key: PropertyKey, value: AnimatableValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&AnimatableValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<AnimatableValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &PropertyKey) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &AnimatableValue)> {
        self.values.iter()
    }

    /// Copy every entry of `other` into this snapshot, overwriting existing keys.
    pub fn merge(&mut self, other: &PropertySnapshot) {
        for (key, value) in other.iter() {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Entries sorted by key, for deterministic delivery.
    pub fn into_sorted_vec(self) -> Vec<(PropertyKey, AnimatableValue)> {
        let mut entries: Vec<_> = self.values.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl FromIterator<(PropertyKey, AnimatableValue)> for PropertySnapshot {
    fn from_iter<I: IntoIterator<Item = (PropertyKey, AnimatableValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Live execution state of one animation run.
#[derive(Debug, Clone)]
pub struct RunState {
    /// The element this run is bound to.
    pub target: TargetId,
    /// Lifecycle state of the run.
    pub state: AnimationState,
    /// Time advanced since start in milliseconds, including any begin delay.
    pub elapsed_ms: f32,
    /// Completed iterations (repeat / auto-reverse cycles).
    pub iteration: u32,
    /// Values the animated properties held before this run took them over.
    pub baseline: PropertySnapshot,
    /// Values currently produced by this run.
    pub values: PropertySnapshot,
    /// Child runs of composite animations.
    pub children: Vec<RunState>,
}

impl RunState {
    pub fn new(target: impl Into<TargetId>) -> Self {
        Self {
            target: target.into(),
            state: AnimationState::Pending,
            elapsed_ms: 0.0,
            iteration: 0,
            baseline: PropertySnapshot::new(),
            values: PropertySnapshot::new(),
            children: Vec::new(),
        }
    }

    /// Seed the baseline with the entries of `snapshot` this run animates.
    pub fn seed_baseline(&mut self, snapshot: &PropertySnapshot, animated: &PropertySet) {
        for key in animated {
            if let Some(value) = snapshot.get(key) {
                self.baseline.set(key.clone(), value.clone());
            }
        }
    }

    /// Replace current values by the baseline. Keys without a known baseline
    /// are dropped: the run leaves nothing behind for them.
    pub fn restore_baseline(&mut self) {
        self.values = self.baseline.clone();
        for child in &mut self.children {
            child.restore_baseline();
        }
    }

    pub fn value(&self, key: &PropertyKey) -> Option<&AnimatableValue> {
        self.values.get(key)
    }

    pub fn is_finished(&self) -> bool {
        self.state == AnimationState::Finished
    }
}
