//! Page-realm configuration

use serde::{Deserialize, Serialize};

/// Tunables for the page-realm modules.
///
/// Deserializes from a partial JSON object; missing fields keep their
/// defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Maximum number of elements returned by a page scan
    pub scan_limit: usize,
    /// Characters of text kept in `TargetElement::text_content`
    pub text_snippet_chars: usize,
    /// Starting offset for slide animations, in CSS pixels
    pub slide_distance_px: f64,
    /// DOM id of the hover overlay
    pub overlay_id: String,
    /// Class added to the hovered element during selection
    pub highlight_class: String,
    /// Body cursor while selecting
    pub selection_cursor: String,
    /// Selectors queried (in order) by a page scan
    pub scan_selectors: Vec<String>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            scan_limit: 50,
            text_snippet_chars: 50,
            slide_distance_px: 50.0,
            overlay_id: "animation-builder-overlay".to_string(),
            highlight_class: "animation-builder-highlight".to_string(),
            selection_cursor: "crosshair".to_string(),
            scan_selectors: DEFAULT_SCAN_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

const DEFAULT_SCAN_SELECTORS: &[&str] = &[
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "p",
    "span",
    "div",
    "section",
    "article",
    "button",
    "a",
    "img",
    "video",
    r#"[class*="title"]"#,
    r#"[class*="heading"]"#,
    r#"[class*="text"]"#,
    r#"[class*="content"]"#,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PageConfig = serde_json::from_str(r#"{"scan_limit": 10}"#).unwrap();
        assert_eq!(config.scan_limit, 10);
        assert_eq!(config.text_snippet_chars, 50);
        assert_eq!(config.scan_selectors.len(), 19);
    }
}
