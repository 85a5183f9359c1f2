//! Page Abstraction Layer for Animation Builder
//!
//! This crate defines the [`PageHal`] trait that lets the selector engine,
//! animation executor and page scanner run against different document
//! backends by abstracting the handful of DOM operations they need.
//!
//! # Implementations
//!
//! - **Browser**: `ab-web::WebPage`, backed by `web-sys`
//! - **Tests**: `ab-hal-mock::MockPage`, an in-memory document tree
//!
//! All operations take `&self`: page realms are single-threaded and every
//! backend is expected to use interior mutability.

use ab_ipc::PageMessage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page Abstraction Layer trait
///
/// Implementations provide:
/// - Element queries and tree navigation
/// - Inline style and class mutation
/// - Layout information
/// - Pointer listener installation
/// - Timers
/// - Window broadcast (`postMessage`)
///
/// # Associated Types
///
/// - `Element`: backend handle to a live element. Handles are compared by
///   identity (two handles are equal iff they refer to the same node).
pub trait PageHal: 'static {
    /// Handle to a live element
    type Element: Clone + PartialEq + core::fmt::Debug + 'static;

    // === Queries ===

    /// First element matching a CSS selector, in document order
    ///
    /// # Returns
    /// * `Ok(Some(element))` - First match
    /// * `Ok(None)` - Selector is valid but matches nothing
    /// * `Err(PageHalError::InvalidSelector)` - Selector could not be parsed
    fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>, PageHalError>;

    /// All elements matching a CSS selector, in document order
    fn query_selector_all(&self, selector: &str) -> Result<Vec<Self::Element>, PageHalError>;

    /// Element with the given native id
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// The document body, if the document has one
    fn body(&self) -> Option<Self::Element>;

    // === Introspection ===

    /// Tag name as the DOM reports it (upper-case for HTML elements)
    fn tag_name(&self, element: &Self::Element) -> String;

    /// Native `id` attribute (empty when absent)
    fn id_attribute(&self, element: &Self::Element) -> String;

    /// Raw `class` attribute
    fn class_name(&self, element: &Self::Element) -> String;

    /// Class tokens in attribute order
    fn class_list(&self, element: &Self::Element) -> Vec<String>;

    /// Concatenated text of the element and its descendants
    fn text_content(&self, element: &Self::Element) -> String;

    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Element children in document order
    fn children(&self, element: &Self::Element) -> Vec<Self::Element>;

    /// Viewport-relative bounding box
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    /// Whether the element is rendered (on the web: `offsetParent !== null`)
    fn has_layout_box(&self, element: &Self::Element) -> bool;

    // === Mutation ===

    /// Inline style value for a property (empty when unset)
    fn style_property(&self, element: &Self::Element, property: &str) -> String;

    /// Set an inline style property. An empty value removes the property.
    fn set_style_property(&self, element: &Self::Element, property: &str, value: &str);

    fn add_class(&self, element: &Self::Element, class: &str);

    fn remove_class(&self, element: &Self::Element, class: &str);

    /// Force a synchronous layout so pending style changes are committed
    fn force_reflow(&self, element: &Self::Element);

    /// Create a detached element
    fn create_element(&self, tag: &str) -> Result<Self::Element, PageHalError>;

    fn set_element_id(&self, element: &Self::Element, id: &str);

    fn append_to_body(&self, element: &Self::Element) -> Result<(), PageHalError>;

    /// Detach an element from the document
    fn remove_element(&self, element: &Self::Element);

    // === Events ===

    /// Install (`true`) or remove (`false`) the capture-phase
    /// `mouseover`/`mouseout`/`click` listeners used during selection.
    ///
    /// Events are delivered to whatever pointer sink the backend was
    /// configured with; see [`PointerEvent`].
    fn listen_pointer_events(&self, enabled: bool) -> Result<(), PageHalError>;

    // === Timers ===

    /// Run `task` once after `delay_ms` milliseconds
    fn set_timeout(&self, delay_ms: f64, task: Box<dyn FnOnce()>) -> TimerId;

    /// Cancel a pending timer. Unknown or fired timers are ignored.
    fn clear_timeout(&self, timer: TimerId);

    // === Broadcast ===

    /// Post a message on the page's window channel
    fn post_message(&self, message: &PageMessage) -> Result<(), PageHalError>;
}

/// Pointer event delivered to the page agent during selection
#[derive(Clone, Debug, PartialEq)]
pub enum PointerEvent<E> {
    Over(E),
    Out(E),
    Click(E),
}

impl<E> PointerEvent<E> {
    /// The event target
    pub fn target(&self) -> &E {
        match self {
            PointerEvent::Over(e) | PointerEvent::Out(e) | PointerEvent::Click(e) => e,
        }
    }
}

/// What the backend should do with the native event after dispatch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerDisposition {
    /// Call `preventDefault()` and `stopPropagation()`
    pub prevent_default: bool,
}

/// Handle returned by [`PageHal::set_timeout`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub i32);

/// Axis-aligned rectangle in CSS pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Page backend errors
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PageHalError {
    /// Selector string could not be parsed
    #[error("invalid selector: {0}")]
    InvalidSelector(String),
    /// No document (or no body) is available in this realm
    #[error("no document available")]
    NoDocument,
    /// The DOM raised an exception
    #[error("DOM exception: {0}")]
    Dom(String),
    /// Message could not be encoded for broadcast
    #[error("broadcast failed: {0}")]
    Broadcast(String),
    /// Operation not supported by this backend
    #[error("operation not supported")]
    NotSupported,
}
