//! Application data model

use ab_ipc::{AnimationData, AnimationType, SlideDirection, TargetElement};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::StudioError;

/// Catalog entry describing an animation template
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationPreset {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AnimationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SlideDirection>,
    pub description: String,
}

/// Named CSS timing function
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EasingOption {
    pub value: String,
    pub label: String,
}

/// A preset bound to one element, with its own timing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationConfig {
    pub id: String,
    /// [`TargetElement::id`] of the animated element
    pub element_id: String,
    /// Selector captured when the config was created
    pub selector: String,
    pub preset: AnimationPreset,
    /// Seconds, > 0
    pub duration: f64,
    /// Seconds, >= 0
    pub delay: f64,
    pub easing: String,
    /// Overrides the preset direction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SlideDirection>,
}

impl AnimationConfig {
    /// New config for `element` with a fresh id
    pub fn new(
        element: &TargetElement,
        preset: AnimationPreset,
        duration: f64,
        delay: f64,
        easing: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("anim-{}-{}", element.id, Uuid::new_v4().simple()),
            element_id: element.id.clone(),
            selector: element.selector.clone(),
            preset,
            duration,
            delay,
            easing: easing.into(),
            direction: None,
        }
    }

    pub fn effective_direction(&self) -> Option<SlideDirection> {
        self.direction.or(self.preset.direction)
    }

    /// Executor parameters, with the executor-level delay given explicitly
    pub fn animation_data(&self, delay: f64) -> AnimationData {
        AnimationData {
            kind: self.preset.kind,
            duration: self.duration,
            delay,
            easing: self.easing.clone(),
            direction: self.effective_direction(),
        }
    }

    pub fn validate(&self) -> Result<(), StudioError> {
        validate_timing(self.duration, self.delay)
    }
}

pub(crate) fn validate_timing(duration: f64, delay: f64) -> Result<(), StudioError> {
    let valid = duration.is_finite() && duration > 0.0 && delay.is_finite() && delay >= 0.0;
    if valid {
        Ok(())
    } else {
        Err(StudioError::InvalidTiming { duration, delay })
    }
}

/// Partial update for an [`AnimationConfig`]; `None` fields are unchanged
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationUpdate {
    pub preset: Option<AnimationPreset>,
    pub duration: Option<f64>,
    pub delay: Option<f64>,
    pub easing: Option<String>,
    pub direction: Option<SlideDirection>,
}

impl AnimationUpdate {
    /// Apply to a copy of `config`
    pub fn applied_to(&self, config: &AnimationConfig) -> AnimationConfig {
        let mut updated = config.clone();
        if let Some(preset) = &self.preset {
            updated.preset = preset.clone();
        }
        if let Some(duration) = self.duration {
            updated.duration = duration;
        }
        if let Some(delay) = self.delay {
            updated.delay = delay;
        }
        if let Some(easing) = &self.easing {
            updated.easing = easing.clone();
        }
        if let Some(direction) = self.direction {
            updated.direction = Some(direction);
        }
        updated
    }
}

/// Placement of one config on the timeline. Always derived, never edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItem {
    pub id: String,
    pub animation: AnimationConfig,
    pub start_time: f64,
    pub end_time: f64,
}

impl TimelineItem {
    pub fn from_config(config: &AnimationConfig) -> Self {
        Self {
            id: format!("timeline-{}", config.id),
            animation: config.clone(),
            start_time: config.delay,
            end_time: config.delay + config.duration,
        }
    }
}

/// Everything the popup renders
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Unique by element id
    pub selected_elements: Vec<TargetElement>,
    pub animations: Vec<AnimationConfig>,
    /// One item per animation, same order
    pub timeline: Vec<TimelineItem>,
    pub is_playing: bool,
    /// Seconds since playback start
    pub current_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    fn element() -> TargetElement {
        TargetElement {
            id: "cta-button".to_string(),
            tag_name: "BUTTON".to_string(),
            class_name: String::new(),
            text_content: "Start".to_string(),
            selector: "#cta-button".to_string(),
        }
    }

    #[test]
    fn test_config_id_and_timeline_item() {
        let preset = presets::preset("slide-left").unwrap();
        let config = AnimationConfig::new(&element(), preset, 1.0, 0.25, "ease");
        assert!(config.id.starts_with("anim-cta-button-"));
        assert_eq!(config.id.len(), "anim-cta-button-".len() + 32);

        let item = TimelineItem::from_config(&config);
        assert_eq!(item.id, format!("timeline-{}", config.id));
        assert_eq!(item.start_time, 0.25);
        assert_eq!(item.end_time, 1.25);
    }

    #[test]
    fn test_direction_override() {
        let preset = presets::preset("slide-up").unwrap();
        let mut config = AnimationConfig::new(&element(), preset, 1.0, 0.0, "ease");
        assert_eq!(config.effective_direction(), Some(SlideDirection::Up));
        config.direction = Some(SlideDirection::Right);
        let data = config.animation_data(0.0);
        assert_eq!(data.direction, Some(SlideDirection::Right));
        assert_eq!(data.kind, AnimationType::Slide);
    }

    #[test]
    fn test_timing_validation() {
        assert!(validate_timing(0.8, 0.0).is_ok());
        assert!(validate_timing(0.0, 0.0).is_err());
        assert!(validate_timing(1.0, -0.1).is_err());
        assert!(validate_timing(f64::NAN, 0.0).is_err());
        assert!(validate_timing(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let state = AppState::default();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["selectedElements"], serde_json::json!([]));
        assert_eq!(json["isPlaying"], false);
    }
}
