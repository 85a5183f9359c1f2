//! Animation parameters carried from the controller to the page

use serde::{Deserialize, Serialize};

/// Entrance animation family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationType {
    Fade,
    Slide,
    Scale,
    Rotate,
    /// Slide applied to several elements with increasing delays
    Stagger,
    /// Fade presented as a text reveal
    TextReveal,
}

impl AnimationType {
    /// Wire name (`"fade"`, `"text-reveal"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationType::Fade => "fade",
            AnimationType::Slide => "slide",
            AnimationType::Scale => "scale",
            AnimationType::Rotate => "rotate",
            AnimationType::Stagger => "stagger",
            AnimationType::TextReveal => "text-reveal",
        }
    }
}

/// Direction of travel for slide-like animations.
///
/// The direction names where the element moves *to*: `Up` starts the element
/// below its rest position and moves it up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SlideDirection {
    /// Starting offset `(x, y)` for a slide of `distance` pixels.
    pub fn start_offset(&self, distance: f64) -> (f64, f64) {
        match self {
            SlideDirection::Up => (0.0, distance),
            SlideDirection::Down => (0.0, -distance),
            SlideDirection::Left => (distance, 0.0),
            SlideDirection::Right => (-distance, 0.0),
        }
    }

    /// True for directions that move along the Y axis
    pub fn is_vertical(&self) -> bool {
        matches!(self, SlideDirection::Up | SlideDirection::Down)
    }
}

/// Parameters for one `animate` request.
///
/// `duration` and `delay` are in seconds. `easing` is any CSS timing function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationData {
    #[serde(rename = "type")]
    pub kind: AnimationType,
    pub duration: f64,
    pub delay: f64,
    pub easing: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SlideDirection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_data_wire_shape() {
        let data = AnimationData {
            kind: AnimationType::TextReveal,
            duration: 0.8,
            delay: 0.0,
            easing: "ease-out".to_string(),
            direction: None,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["type"], "text-reveal");
        assert!(json.get("direction").is_none());
    }

    #[test]
    fn test_slide_offsets() {
        assert_eq!(SlideDirection::Up.start_offset(50.0), (0.0, 50.0));
        assert_eq!(SlideDirection::Down.start_offset(50.0), (0.0, -50.0));
        assert_eq!(SlideDirection::Left.start_offset(50.0), (50.0, 0.0));
        assert_eq!(SlideDirection::Right.start_offset(50.0), (-50.0, 0.0));
    }
}
