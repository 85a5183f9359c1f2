//! Built-in preset and easing catalogs

use ab_ipc::{AnimationType, SlideDirection};

use crate::{AnimationPreset, EasingOption};

struct PresetDef {
    id: &'static str,
    name: &'static str,
    kind: AnimationType,
    direction: Option<SlideDirection>,
    description: &'static str,
}

const PRESETS: &[PresetDef] = &[
    PresetDef {
        id: "fade-in",
        name: "Fade In",
        kind: AnimationType::Fade,
        direction: None,
        description: "Element fades in from transparent to opaque",
    },
    PresetDef {
        id: "slide-up",
        name: "Slide Up",
        kind: AnimationType::Slide,
        direction: Some(SlideDirection::Up),
        description: "Element slides up from below",
    },
    PresetDef {
        id: "slide-down",
        name: "Slide Down",
        kind: AnimationType::Slide,
        direction: Some(SlideDirection::Down),
        description: "Element slides down from above",
    },
    PresetDef {
        id: "slide-left",
        name: "Slide Left",
        kind: AnimationType::Slide,
        direction: Some(SlideDirection::Left),
        description: "Element slides in from the right",
    },
    PresetDef {
        id: "slide-right",
        name: "Slide Right",
        kind: AnimationType::Slide,
        direction: Some(SlideDirection::Right),
        description: "Element slides in from the left",
    },
    PresetDef {
        id: "scale-in",
        name: "Scale In",
        kind: AnimationType::Scale,
        direction: None,
        description: "Element scales up from 0 to 1",
    },
    PresetDef {
        id: "rotate-in",
        name: "Rotate In",
        kind: AnimationType::Rotate,
        direction: None,
        description: "Element rotates in with a spin effect",
    },
    PresetDef {
        id: "stagger-up",
        name: "Stagger Up",
        kind: AnimationType::Stagger,
        direction: Some(SlideDirection::Up),
        description: "Multiple elements animate with staggered timing",
    },
    PresetDef {
        id: "text-reveal",
        name: "Text Reveal",
        kind: AnimationType::TextReveal,
        direction: None,
        description: "Text reveals character by character",
    },
];

const EASINGS: &[(&str, &str)] = &[
    ("ease", "Ease"),
    ("ease-in", "Ease In"),
    ("ease-out", "Ease Out"),
    ("ease-in-out", "Ease In Out"),
    ("linear", "Linear"),
    ("cubic-bezier(0.4, 0, 0.2, 1)", "Smooth"),
    ("cubic-bezier(0.68, -0.55, 0.265, 1.55)", "Bounce"),
    ("cubic-bezier(0.25, 0.46, 0.45, 0.94)", "Elegant"),
];

impl From<&PresetDef> for AnimationPreset {
    fn from(def: &PresetDef) -> Self {
        Self {
            id: def.id.to_string(),
            name: def.name.to_string(),
            kind: def.kind,
            direction: def.direction,
            description: def.description.to_string(),
        }
    }
}

/// All presets, in display order
pub fn presets() -> Vec<AnimationPreset> {
    PRESETS.iter().map(AnimationPreset::from).collect()
}

/// Look up a preset by id
pub fn preset(id: &str) -> Option<AnimationPreset> {
    PRESETS.iter().find(|p| p.id == id).map(AnimationPreset::from)
}

/// All easing options, in display order
pub fn easings() -> Vec<EasingOption> {
    EASINGS
        .iter()
        .map(|(value, label)| EasingOption {
            value: value.to_string(),
            label: label.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(presets().len(), 9);
        assert_eq!(easings().len(), 8);
    }

    #[test]
    fn test_lookup() {
        let stagger = preset("stagger-up").unwrap();
        assert_eq!(stagger.kind, AnimationType::Stagger);
        assert_eq!(stagger.direction, Some(SlideDirection::Up));
        assert!(preset("bounce-in").is_none());
    }
}
