//! Selection mode state machine
//!
//! `Idle -> Selecting` on [`SelectorEngine::start`]. While selecting, hovered
//! elements get the highlight class and the overlay tracks their bounding box.
//! The first click is swallowed, described, and ends selection; so does an
//! explicit [`SelectorEngine::stop`].

use std::rc::Rc;

use ab_hal::{PageHal, PageHalError, PointerDisposition, PointerEvent};
use ab_ipc::TargetElement;

use crate::selector::{describe_element, escape_ident};
use crate::PageConfig;

/// Overlay styling applied on creation
const OVERLAY_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("top", "0"),
    ("left", "0"),
    ("width", "100%"),
    ("height", "100%"),
    ("background", "rgba(59, 130, 246, 0.1)"),
    ("pointer-events", "none"),
    ("z-index", "999999"),
    ("display", "none"),
    ("border", "2px solid #3b82f6"),
    ("border-radius", "4px"),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    Selecting,
}

/// Result of feeding a pointer event to the engine
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerOutcome {
    pub disposition: PointerDisposition,
    /// Set when a click completed the selection
    pub selected: Option<TargetElement>,
}

/// Click-to-select state machine
pub struct SelectorEngine<H: PageHal> {
    hal: Rc<H>,
    config: PageConfig,
    state: SelectionState,
    overlay: Option<H::Element>,
}

impl<H: PageHal> SelectorEngine<H> {
    pub fn new(hal: Rc<H>, config: PageConfig) -> Self {
        Self {
            hal,
            config,
            state: SelectionState::Idle,
            overlay: None,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_selecting(&self) -> bool {
        self.state == SelectionState::Selecting
    }

    /// Enter selection mode. Starting while already selecting is a no-op.
    pub fn start(&mut self) -> Result<(), PageHalError> {
        if self.is_selecting() {
            tracing::debug!("selection already active");
            return Ok(());
        }

        self.set_cursor(&self.config.selection_cursor.clone());
        let overlay = match self.create_overlay() {
            Ok(overlay) => overlay,
            Err(e) => {
                self.set_cursor("");
                return Err(e);
            }
        };
        self.overlay = Some(overlay);

        if let Err(e) = self.hal.listen_pointer_events(true) {
            self.teardown();
            return Err(e);
        }

        self.state = SelectionState::Selecting;
        tracing::info!("element selection started");
        Ok(())
    }

    /// Leave selection mode: listeners, overlay, highlights and cursor are
    /// all cleaned up even if the engine thought it was idle.
    pub fn stop(&mut self) {
        self.teardown();
        if self.state == SelectionState::Selecting {
            tracing::info!("element selection stopped");
        }
        self.state = SelectionState::Idle;
    }

    /// Feed a pointer event. Events outside selection mode are ignored.
    pub fn handle_pointer(&mut self, event: PointerEvent<H::Element>) -> PointerOutcome {
        if !self.is_selecting() {
            return PointerOutcome::default();
        }

        match event {
            PointerEvent::Over(element) => {
                self.hal.add_class(&element, &self.config.highlight_class);
                if let Some(overlay) = &self.overlay {
                    let rect = self.hal.bounding_rect(&element);
                    self.hal.set_style_property(overlay, "display", "block");
                    self.hal.set_style_property(overlay, "top", &format!("{}px", rect.top));
                    self.hal.set_style_property(overlay, "left", &format!("{}px", rect.left));
                    self.hal.set_style_property(overlay, "width", &format!("{}px", rect.width));
                    self.hal.set_style_property(overlay, "height", &format!("{}px", rect.height));
                }
                PointerOutcome::default()
            }
            PointerEvent::Out(element) => {
                self.hal.remove_class(&element, &self.config.highlight_class);
                if let Some(overlay) = &self.overlay {
                    self.hal.set_style_property(overlay, "display", "none");
                }
                PointerOutcome::default()
            }
            PointerEvent::Click(element) => {
                let selected = describe_element(&*self.hal, &element, &self.config);
                tracing::info!(selector = %selected.selector, id = %selected.id, "element selected");
                self.stop();
                PointerOutcome {
                    disposition: PointerDisposition {
                        prevent_default: true,
                    },
                    selected: Some(selected),
                }
            }
        }
    }

    fn create_overlay(&self) -> Result<H::Element, PageHalError> {
        if let Some(stale) = self.hal.element_by_id(&self.config.overlay_id) {
            self.hal.remove_element(&stale);
        }
        let overlay = self.hal.create_element("div")?;
        self.hal.set_element_id(&overlay, &self.config.overlay_id);
        for (property, value) in OVERLAY_STYLE {
            self.hal.set_style_property(&overlay, property, value);
        }
        self.hal.append_to_body(&overlay)?;
        Ok(overlay)
    }

    fn teardown(&mut self) {
        if let Err(e) = self.hal.listen_pointer_events(false) {
            tracing::warn!(error = %e, "failed to remove selection listeners");
        }

        match self.overlay.take() {
            Some(overlay) => self.hal.remove_element(&overlay),
            None => {
                if let Some(stale) = self.hal.element_by_id(&self.config.overlay_id) {
                    self.hal.remove_element(&stale);
                }
            }
        }

        let highlighted = format!(".{}", escape_ident(&self.config.highlight_class));
        match self.hal.query_selector_all(&highlighted) {
            Ok(elements) => {
                for element in elements {
                    self.hal.remove_class(&element, &self.config.highlight_class);
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to strip highlights"),
        }

        self.set_cursor("");
    }

    fn set_cursor(&self, cursor: &str) {
        if let Some(body) = self.hal.body() {
            self.hal.set_style_property(&body, "cursor", cursor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_hal::Rect;
    use ab_hal_mock::{ElementSpec, MockPage};

    fn engine() -> (Rc<MockPage>, SelectorEngine<MockPage>) {
        let page = Rc::new(MockPage::new());
        let engine = SelectorEngine::new(Rc::clone(&page), PageConfig::default());
        (page, engine)
    }

    #[test]
    fn test_start_installs_overlay_and_listeners() {
        let (page, mut engine) = engine();
        engine.start().unwrap();

        assert_eq!(engine.state(), SelectionState::Selecting);
        assert!(page.is_listening());
        let overlay = page.element_by_id("animation-builder-overlay").unwrap();
        assert_eq!(page.style(&overlay, "display"), "none");
        assert_eq!(page.style(&page.body_element(), "cursor"), "crosshair");
    }

    #[test]
    fn test_start_twice_keeps_single_overlay() {
        let (page, mut engine) = engine();
        engine.start().unwrap();
        engine.start().unwrap();
        assert_eq!(page.query_selector_all("#animation-builder-overlay").unwrap().len(), 1);
    }

    #[test]
    fn test_hover_positions_overlay() {
        let (page, mut engine) = engine();
        let card = page.append_to_body_spec(
            ElementSpec::new("div").class("card").layout(Rect::new(10.0, 20.0, 300.0, 40.0)),
        );
        engine.start().unwrap();

        engine.handle_pointer(PointerEvent::Over(card));
        let overlay = page.element_by_id("animation-builder-overlay").unwrap();
        assert!(page.has_class(&card, "animation-builder-highlight"));
        assert_eq!(page.style(&overlay, "display"), "block");
        assert_eq!(page.style(&overlay, "top"), "20px");
        assert_eq!(page.style(&overlay, "left"), "10px");
        assert_eq!(page.style(&overlay, "width"), "300px");

        engine.handle_pointer(PointerEvent::Out(card));
        assert!(!page.has_class(&card, "animation-builder-highlight"));
        assert_eq!(page.style(&overlay, "display"), "none");
    }

    #[test]
    fn test_click_selects_once_and_stops() {
        let (page, mut engine) = engine();
        let button = page.append_to_body_spec(ElementSpec::new("button").id("cta-button").text("Go"));
        engine.start().unwrap();
        engine.handle_pointer(PointerEvent::Over(button));

        let outcome = engine.handle_pointer(PointerEvent::Click(button));
        assert!(outcome.disposition.prevent_default);
        let selected = outcome.selected.unwrap();
        assert_eq!(selected.selector, "#cta-button");
        assert_eq!(selected.tag_name, "BUTTON");

        assert_eq!(engine.state(), SelectionState::Idle);
        assert!(!page.is_listening());
        assert!(page.element_by_id("animation-builder-overlay").is_none());
        assert!(!page.has_class(&button, "animation-builder-highlight"));

        let second = engine.handle_pointer(PointerEvent::Click(button));
        assert_eq!(second, PointerOutcome::default());
    }

    #[test]
    fn test_stop_strips_every_highlight() {
        let (page, mut engine) = engine();
        let a = page.append_to_body_spec(ElementSpec::new("p").text("a"));
        let b = page.append_to_body_spec(ElementSpec::new("p").text("b"));
        engine.start().unwrap();
        engine.handle_pointer(PointerEvent::Over(a));
        engine.handle_pointer(PointerEvent::Over(b));

        engine.stop();
        assert!(!page.has_class(&a, "animation-builder-highlight"));
        assert!(!page.has_class(&b, "animation-builder-highlight"));
        assert_eq!(page.style(&page.body_element(), "cursor"), "");
    }

    #[test]
    fn test_events_ignored_when_idle() {
        let (page, mut engine) = engine();
        let p = page.append_to_body_spec(ElementSpec::new("p"));
        engine.handle_pointer(PointerEvent::Over(p));
        assert!(!page.has_class(&p, "animation-builder-highlight"));
    }
}
