//! Lifecycle events delivered to the owner of the scheduler.
//!
//! Runs never call back into their collaborators. Instead, every lifecycle
//! transition is queued as an `AnimatorEvent` and polled after `start`,
//! `stop` or `advance`.
//!
//! # Usage
//!
//! ```ignore
//! use rune_animation::{Animator, AnimatorEvent};
//!
//! animator.advance(16.67)?;
//! for event in animator.drain_events() {
//!     match event {
//!         AnimatorEvent::Finished { target, committed, .. } => {
//!             println!("{target} settled with {} values", committed.len());
//!         }
//!         AnimatorEvent::Replaced { animation_id, by, .. } => {
//!             println!("{animation_id} replaced by {by}");
//!         }
//!         _ => {}
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::warn;

use crate::types::{AnimatableValue, AnimationId, PropertyKey, TargetId};

/// Event emitted when a run changes lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimatorEvent {
    /// Run registered and started.
    Started {
        animation_id: AnimationId,
        target: TargetId,
        name: String,
    },
    /// Run completed naturally and committed its values.
    Finished {
        animation_id: AnimationId,
        target: TargetId,
        name: String,
        /// Committed values, sorted by key.
        committed: Vec<(PropertyKey, AnimatableValue)>,
    },
    /// Run was finalized early and evicted by a snapshot-and-replace handoff.
    Replaced {
        animation_id: AnimationId,
        target: TargetId,
        name: String,
        /// The run that took over.
        by: AnimationId,
    },
    /// Run was force-stopped.
    Stopped {
        animation_id: AnimationId,
        target: TargetId,
        name: String,
    },
    /// Run failed while advancing or finalizing and was evicted.
    Failed {
        animation_id: AnimationId,
        target: TargetId,
        name: String,
        error: String,
    },
}

impl AnimatorEvent {
    pub fn animation_id(&self) -> AnimationId {
        match self {
            Self::Started { animation_id, .. }
            | Self::Finished { animation_id, .. }
            | Self::Replaced { animation_id, .. }
            | Self::Stopped { animation_id, .. }
            | Self::Failed { animation_id, .. } => *animation_id,
        }
    }

    pub fn target(&self) -> &TargetId {
        match self {
            Self::Started { target, .. }
            | Self::Finished { target, .. }
            | Self::Replaced { target, .. }
            | Self::Stopped { target, .. }
            | Self::Failed { target, .. } => target,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Started { name, .. }
            | Self::Finished { name, .. }
            | Self::Replaced { name, .. }
            | Self::Stopped { name, .. }
            | Self::Failed { name, .. } => name,
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    pub fn is_replaced(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// FIFO of pending events. With a limit set, the oldest event is dropped
/// to make room for a new one.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<AnimatorEvent>,
    limit: Option<usize>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            events: VecDeque::new(),
            limit,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn push(&mut self, event: AnimatorEvent) {
        if let Some(limit) = self.limit {
            if limit == 0 {
                warn!(event = ?event, "event queue has no capacity, dropping event");
                return;
            }
            while self.events.len() >= limit {
                if let Some(dropped) = self.events.pop_front() {
                    warn!(
                        limit,
                        animation_id = %dropped.animation_id(),
                        "event queue full, dropping oldest event"
                    );
                }
            }
        }
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn pop(&mut self) -> Option<AnimatorEvent> {
        self.events.pop_front()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = AnimatorEvent> + '_ {
        self.events.drain(..)
    }

    pub fn peek(&self) -> Option<&AnimatorEvent> {
        self.events.front()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Pending events for one target, oldest first.
    pub fn events_for_target(&self, target: &TargetId) -> Vec<&AnimatorEvent> {
        self.events.iter().filter(|e| e.target() == target).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AnimatableProperty;

    fn started(id: u64, target: &str) -> AnimatorEvent {
        AnimatorEvent::Started {
            animation_id: AnimationId(id),
            target: TargetId::new(target),
            name: "fade".to_string(),
        }
    }

    #[test]
    fn test_event_accessors() {
        let event = AnimatorEvent::Replaced {
            animation_id: AnimationId(1),
            target: TargetId::new("node_1"),
            name: "slide".to_string(),
            by: AnimationId(2),
        };

        assert_eq!(event.animation_id(), AnimationId(1));
        assert_eq!(event.target().as_str(), "node_1");
        assert_eq!(event.name(), "slide");
        assert!(event.is_replaced());
        assert!(!event.is_finished());
    }

    #[test]
    fn test_event_predicates() {
        let stopped = AnimatorEvent::Stopped {
            animation_id: AnimationId(1),
            target: TargetId::new("n"),
            name: String::new(),
        };
        assert!(stopped.is_stopped());
        assert!(!stopped.is_started());
        assert!(!stopped.is_failed());

        assert!(started(2, "n").is_started());
    }

    #[test]
    fn test_event_queue_operations() {
        let mut queue = EventQueue::new();
        assert!(queue.is_empty());

        queue.push(started(1, "a"));
        queue.push(started(2, "b"));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek().map(|e| e.animation_id()), Some(AnimationId(1)));

        assert_eq!(queue.pop().map(|e| e.animation_id()), Some(AnimationId(1)));
        assert_eq!(queue.pop().map(|e| e.animation_id()), Some(AnimationId(2)));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_event_queue_drain_and_clear() {
        let mut queue = EventQueue::new();
        queue.push(started(1, "a"));
        queue.push(started(2, "a"));

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events.len(), 2);
        assert!(queue.is_empty());

        queue.push(started(3, "a"));
        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_events_for_target() {
        let mut queue = EventQueue::new();
        queue.push(started(1, "node_1"));
        queue.push(started(2, "node_2"));
        queue.push(started(3, "node_1"));

        assert_eq!(queue.events_for_target(&TargetId::new("node_1")).len(), 2);
        assert_eq!(queue.events_for_target(&TargetId::new("node_2")).len(), 1);
        assert!(queue.events_for_target(&TargetId::new("node_3")).is_empty());
    }

    #[test]
    fn test_bounded_queue_drops_oldest() {
        let mut queue = EventQueue::with_limit(Some(2));
        queue.push(started(1, "n"));
        queue.push(started(2, "n"));
        queue.push(started(3, "n"));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().map(|e| e.animation_id()), Some(AnimationId(2)));
    }

    #[test]
    fn test_event_serialization() {
        let event = AnimatorEvent::Finished {
            animation_id: AnimationId(42),
            target: TargetId::new("button_1"),
            name: "pulse".to_string(),
            committed: vec![(
                PropertyKey::new("button_1", AnimatableProperty::Opacity),
                AnimatableValue::from(1.0),
            )],
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("finished"));
        assert!(json.contains("button_1"));

        let parsed: AnimatorEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
