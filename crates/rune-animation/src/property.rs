//! Single-property animations.

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;
use crate::interpolate::Interpolate;
use crate::run_state::RunState;
use crate::timeline::Timing;
use crate::types::{AnimatableProperty, AnimatableValue, PropertyKey, TargetId};

/// Animates one property from a start value to `to`.
///
/// The start value is `from` when given, otherwise the baseline the run took
/// over, otherwise `to` itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAnimation {
    #[serde(default)]
    pub name: String,
    /// Element to animate instead of the run's target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<TargetId>,
    pub property: AnimatableProperty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<AnimatableValue>,
    pub to: AnimatableValue,
    #[serde(default)]
    pub timing: Timing,
}

impl PropertyAnimation {
    pub fn new(
        name: impl Into<String>,
        property: AnimatableProperty,
        to: impl Into<AnimatableValue>,
    ) -> Self {
        Self {
            name: name.into(),
            target_name: None,
            property,
            from: None,
            to: to.into(),
            timing: Timing::default(),
        }
    }

    pub fn from(mut self, from: impl Into<AnimatableValue>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn target_name(mut self, target: impl Into<TargetId>) -> Self {
        self.target_name = Some(target.into());
        self
    }

    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// The key this animation writes for a run.
    pub fn key(&self, state: &RunState) -> PropertyKey {
        let target = self.target_name.as_ref().unwrap_or(&state.target);
        PropertyKey::new(target, self.property)
    }

    /// Write the value at shaped progress `t`.
    pub(crate) fn apply(&self, state: &mut RunState, t: f32) -> Result<(), AnimationError> {
        let key = self.key(state);
        let start = self
            .from
            .as_ref()
            .or_else(|| state.baseline.get(&key))
            .unwrap_or(&self.to);
        if start.value_type() != self.to.value_type() {
            return Err(AnimationError::ValueMismatch {
                property: self.property,
                from: start.value_type(),
                to: self.to.value_type(),
            });
        }
        let value = start.interpolate(&self.to, t);
        state.values.set(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_value_falls_back_to_baseline() {
        let anim = PropertyAnimation::new("w", AnimatableProperty::Width, 200.0);
        let mut state = RunState::new("n");
        let key = anim.key(&state);
        state.baseline.set(key.clone(), 100.0.into());

        anim.apply(&mut state, 0.5).unwrap();
        assert_eq!(state.value(&key).and_then(|v| v.as_f64()), Some(150.0));
    }

    #[test]
    fn test_without_start_value_holds_target() {
        let anim = PropertyAnimation::new("w", AnimatableProperty::Width, 200.0);
        let mut state = RunState::new("n");
        anim.apply(&mut state, 0.1).unwrap();
        let key = anim.key(&state);
        assert_eq!(state.value(&key).and_then(|v| v.as_f64()), Some(200.0));
    }

    #[test]
    fn test_target_name_redirects_key() {
        let anim =
            PropertyAnimation::new("o", AnimatableProperty::Opacity, 1.0).target_name("icon");
        let state = RunState::new("button");
        assert_eq!(anim.key(&state).target.as_str(), "icon");
    }

    #[test]
    fn test_mismatched_values_fail() {
        let red = [1.0_f32, 0.0, 0.0, 1.0];
        let anim =
            PropertyAnimation::new("bg", AnimatableProperty::BackgroundColor, red).from(0.5);
        let mut state = RunState::new("n");
        let err = anim.apply(&mut state, 0.5).unwrap_err();
        assert!(matches!(err, AnimationError::ValueMismatch { .. }));
    }
}
