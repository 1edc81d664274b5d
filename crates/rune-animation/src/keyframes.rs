//! Keyframe tracks for one property.
//!
//! Offsets run from 0.0 (start of an iteration) to 1.0 (end). When the first
//! keyframe sits after 0.0, the track starts from the value the property held
//! when the run took over (or the first keyframe's value if none is known).
//!
//! ```
//! use rune_animation::keyframes::KeyframeAnimation;
//! use rune_animation::timeline::Timing;
//! use rune_animation::types::AnimatableProperty;
//!
//! let pulse = KeyframeAnimation::new("pulse", AnimatableProperty::Opacity)
//!     .keyframe(0.5, 0.2)
//!     .keyframe(1.0, 1.0)
//!     .timing(Timing::with_duration(400.0));
//! assert_eq!(pulse.keyframes.len(), 2);
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::easing::EasingFunction;
use crate::error::AnimationError;
use crate::interpolate::Interpolate;
use crate::run_state::RunState;
use crate::timeline::Timing;
use crate::types::{AnimatableProperty, AnimatableValue, PropertyKey, TargetId};

/// A value at one point of the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Position in the iteration (0.0 to 1.0).
    pub offset: f32,
    pub value: AnimatableValue,
    /// Easing used when interpolating TO this keyframe. Linear when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub easing: Option<EasingFunction>,
}

impl Keyframe {
    pub fn new(offset: f32, value: impl Into<AnimatableValue>) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            value: value.into(),
            easing: None,
        }
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = Some(easing);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeAnimation {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<TargetId>,
    pub property: AnimatableProperty,
    /// Sorted by offset. Loaded tracks are clamped and sorted as they are read.
    #[serde(deserialize_with = "deserialize_track")]
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub timing: Timing,
}

impl KeyframeAnimation {
    pub fn new(name: impl Into<String>, property: AnimatableProperty) -> Self {
        Self {
            name: name.into(),
            target_name: None,
            property,
            keyframes: Vec::new(),
            timing: Timing::default(),
        }
    }

    pub fn keyframe(self, offset: f32, value: impl Into<AnimatableValue>) -> Self {
        self.add_keyframe(Keyframe::new(offset, value))
    }

    pub fn add_keyframe(mut self, keyframe: Keyframe) -> Self {
        self.keyframes.push(keyframe);
        sort_by_offset(&mut self.keyframes);
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

    pub fn key(&self, state: &RunState) -> PropertyKey {
        let target = self.target_name.as_ref().unwrap_or(&state.target);
        PropertyKey::new(target, self.property)
    }

    /// Value of the track at `offset`, starting from `start` when the first
    /// keyframe is later than 0.0.
    pub fn value_at(
        &self,
        start: Option<&AnimatableValue>,
        offset: f32,
    ) -> Result<AnimatableValue, AnimationError> {
        let first = self
            .keyframes
            .first()
            .ok_or_else(|| AnimationError::EmptyKeyframes(self.name.clone()))?;
        let offset = offset.clamp(0.0, 1.0);

        let implicit_start = (first.offset > 0.0).then(|| Keyframe {
            offset: 0.0,
            value: start.unwrap_or(&first.value).clone(),
            easing: None,
        });
        let mut frames = implicit_start.iter().chain(self.keyframes.iter());

        let Some(mut from) = frames.next() else {
            return Err(AnimationError::EmptyKeyframes(self.name.clone()));
        };
        let mut to = from;
        for frame in frames {
            to = frame;
            if frame.offset >= offset {
                break;
            }
            from = frame;
        }

        if from.value.value_type() != to.value.value_type() {
            return Err(AnimationError::ValueMismatch {
                property: self.property,
                from: from.value.value_type(),
                to: to.value.value_type(),
            });
        }

        let range = to.offset - from.offset;
        let local = if range > 0.0 {
            ((offset - from.offset) / range).clamp(0.0, 1.0)
        } else if offset >= to.offset {
            1.0
        } else {
            0.0
        };
        let eased = to.easing.unwrap_or_default().evaluate(local);
        Ok(from.value.interpolate(&to.value, eased))
    }

    pub(crate) fn apply(&self, state: &mut RunState, t: f32) -> Result<(), AnimationError> {
        let key = self.key(state);
        let value = self.value_at(state.baseline.get(&key), t)?;
        state.values.set(key, value);
        Ok(())
    }
}

/// Stable, so keyframes sharing an offset keep their order.
fn sort_by_offset(keyframes: &mut [Keyframe]) {
    keyframes.sort_by(|a, b| a.offset.total_cmp(&b.offset));
}

fn deserialize_track<'de, D>(deserializer: D) -> Result<Vec<Keyframe>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut keyframes = Vec::<Keyframe>::deserialize(deserializer)?;
    for keyframe in &mut keyframes {
        if !keyframe.offset.is_finite() {
            return Err(serde::de::Error::custom(format!(
                "keyframe offset must be finite, got {}",
                keyframe.offset
            )));
        }
        keyframe.offset = keyframe.offset.clamp(0.0, 1.0);
    }
    sort_by_offset(&mut keyframes);
    Ok(keyframes)
}
