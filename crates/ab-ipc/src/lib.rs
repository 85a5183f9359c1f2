//! Cross-realm message protocol for Animation Builder
//!
//! This crate is the **single source of truth** for every message that crosses
//! an isolation boundary:
//!
//! | Hop | Boundary | Messages |
//! |-----|----------|----------|
//! | A | popup ↔ background ↔ content (extension runtime) | [`Command`], [`Response`], [`ControllerEvent`] |
//! | B | content ↔ injected (window `postMessage`) | [`PageMessage`] |
//! | C | injected ↔ DOM | none (direct calls) |
//!
//! Types that only describe page elements or animations ([`TargetElement`],
//! [`AnimationData`]) are shared by all hops because they are carried
//! verbatim across every boundary.
//!
//! # Usage
//!
//! ```rust
//! use ab_ipc::{Command, PageMessage};
//!
//! let cmd: Command = serde_json::from_str(r#"{"action":"startElementSelection"}"#).unwrap();
//! assert_eq!(PageMessage::from_command(&cmd), Some(PageMessage::StartSelection));
//! ```

mod animation;
mod element;
mod error;
mod messages;

pub use animation::{AnimationData, AnimationType, SlideDirection};
pub use element::{ElementKind, TargetElement};
pub use error::ProtocolError;
pub use messages::{
    Command, CommandAck, ControllerEvent, PageElements, PageMessage, Response, RuntimeMessage,
};

// =============================================================================
// In-page broadcast type tags (content ↔ injected)
// =============================================================================

/// Enter selection mode.
pub const MSG_START_SELECTION: &str = "ANIMATION_BUILDER_START_SELECTION";

/// Leave selection mode.
pub const MSG_STOP_SELECTION: &str = "ANIMATION_BUILDER_STOP_SELECTION";

/// Play an entrance animation on `elementId`.
pub const MSG_ANIMATE: &str = "ANIMATION_BUILDER_ANIMATE";

/// Restore the inline styles captured for `elementId`.
pub const MSG_RESET: &str = "ANIMATION_BUILDER_RESET";

/// Reverse notification: the user clicked an element in selection mode.
pub const MSG_ELEMENT_SELECTED: &str = "ELEMENT_SELECTED";

// =============================================================================
// Extension runtime action names (popup ↔ background ↔ content)
// =============================================================================

pub const ACTION_START_SELECTION: &str = "startElementSelection";
pub const ACTION_STOP_SELECTION: &str = "stopElementSelection";
pub const ACTION_ANIMATE: &str = "animateElement";
pub const ACTION_RESET: &str = "resetElement";
pub const ACTION_GET_PAGE_ELEMENTS: &str = "getPageElements";
pub const ACTION_ELEMENT_SELECTED: &str = "elementSelected";
