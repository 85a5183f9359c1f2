//! Element descriptors that survive realm boundaries

use serde::{Deserialize, Serialize};

/// A page element as seen from outside the page.
///
/// Live DOM nodes cannot cross into the extension, so an element is identified
/// by `id` and re-located with `selector`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetElement {
    pub id: String,
    pub tag_name: String,
    pub class_name: String,
    /// Leading text snippet (truncated)
    pub text_content: String,
    pub selector: String,
}

/// Coarse category used by the popup for labelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Image,
    Button,
    Container,
}

impl TargetElement {
    /// Category derived from the tag name
    pub fn kind(&self) -> ElementKind {
        match self.tag_name.to_ascii_lowercase().as_str() {
            "img" => ElementKind::Image,
            "button" => ElementKind::Button,
            "div" | "section" | "article" => ElementKind::Container,
            _ => ElementKind::Text,
        }
    }

    /// Label shown in the popup: the text snippet, or the tag name for empty elements
    pub fn display_name(&self) -> &str {
        if self.text_content.trim().is_empty() {
            &self.tag_name
        } else {
            &self.text_content
        }
    }
}
