//! `web-sys` page backend

use std::cell::RefCell;
use std::rc::Rc;

use ab_hal::{PageHal, PageHalError, PointerDisposition, PointerEvent, Rect, TimerId};
use ab_ipc::PageMessage;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, Window};

use crate::util::{self, js_error_message};

/// Receiver of pointer events captured during selection
pub type PointerSink = Rc<dyn Fn(PointerEvent<Element>) -> PointerDisposition>;

type Listener = (&'static str, Closure<dyn FnMut(Event)>);

const POINTER_EVENTS: [&str; 3] = ["mouseover", "mouseout", "click"];

/// [`PageHal`] over the live document of the current window
pub struct WebPage {
    window: Window,
    document: Document,
    sink: Rc<RefCell<Option<PointerSink>>>,
    listeners: RefCell<Vec<Listener>>,
    // Listeners removed from inside their own dispatch; freed on the next
    // install
    retired: RefCell<Vec<Listener>>,
}

impl WebPage {
    pub fn new() -> Result<Self, PageHalError> {
        let window = web_sys::window().ok_or(PageHalError::NoDocument)?;
        let document = window.document().ok_or(PageHalError::NoDocument)?;
        Ok(Self {
            window,
            document,
            sink: Rc::new(RefCell::new(None)),
            listeners: RefCell::new(Vec::new()),
            retired: RefCell::new(Vec::new()),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Route pointer events captured by [`PageHal::listen_pointer_events`]
    pub fn set_pointer_sink(&self, sink: PointerSink) {
        *self.sink.borrow_mut() = Some(sink);
    }

    fn install_listeners(&self) -> Result<(), PageHalError> {
        self.retired.borrow_mut().clear();
        if !self.listeners.borrow().is_empty() {
            return Ok(());
        }

        let mut listeners = Vec::with_capacity(POINTER_EVENTS.len());
        for kind in POINTER_EVENTS {
            let sink = Rc::clone(&self.sink);
            let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                    return;
                };
                let pointer = match kind {
                    "mouseover" => PointerEvent::Over(target),
                    "mouseout" => PointerEvent::Out(target),
                    _ => PointerEvent::Click(target),
                };
                // Clone out so the sink may reconfigure listeners
                let current = sink.borrow().clone();
                if let Some(sink) = current {
                    if sink(pointer).prevent_default {
                        event.prevent_default();
                        event.stop_propagation();
                    }
                }
            });
            self.document
                .add_event_listener_with_callback_and_bool(kind, closure.as_ref().unchecked_ref(), true)
                .map_err(|e| PageHalError::Dom(js_error_message(&e)))?;
            listeners.push((kind, closure));
        }
        *self.listeners.borrow_mut() = listeners;
        Ok(())
    }

    fn remove_listeners(&self) {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for (kind, closure) in &listeners {
            let _ = self.document.remove_event_listener_with_callback_and_bool(
                kind,
                closure.as_ref().unchecked_ref(),
                true,
            );
        }
        self.retired.borrow_mut().extend(listeners);
    }
}

impl Drop for WebPage {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}

fn dom_error(error: JsValue) -> PageHalError {
    PageHalError::Dom(js_error_message(&error))
}

fn selector_error(selector: &str) -> PageHalError {
    PageHalError::InvalidSelector(selector.to_string())
}

impl PageHal for WebPage {
    type Element = Element;

    fn query_selector(&self, selector: &str) -> Result<Option<Element>, PageHalError> {
        self.document
            .query_selector(selector)
            .map_err(|_| selector_error(selector))
    }

    fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, PageHalError> {
        let nodes = self
            .document
            .query_selector_all(selector)
            .map_err(|_| selector_error(selector))?;
        Ok((0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn tag_name(&self, element: &Element) -> String {
        element.tag_name()
    }

    fn id_attribute(&self, element: &Element) -> String {
        element.id()
    }

    fn class_name(&self, element: &Element) -> String {
        // SVG elements expose an SVGAnimatedString here; read the attribute
        element.get_attribute("class").unwrap_or_default()
    }

    fn class_list(&self, element: &Element) -> Vec<String> {
        let list = element.class_list();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn parent(&self, element: &Element) -> Option<Element> {
        element.parent_element()
    }

    fn children(&self, element: &Element) -> Vec<Element> {
        let children = element.children();
        (0..children.length()).filter_map(|i| children.item(i)).collect()
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect::new(rect.x(), rect.y(), rect.width(), rect.height())
    }

    fn has_layout_box(&self, element: &Element) -> bool {
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => html.offset_parent().is_some(),
            None => true,
        }
    }

    fn style_property(&self, element: &Element, property: &str) -> String {
        element
            .dyn_ref::<HtmlElement>()
            .and_then(|html| html.style().get_property_value(property).ok())
            .unwrap_or_default()
    }

    fn set_style_property(&self, element: &Element, property: &str, value: &str) {
        let Some(html) = element.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = html.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
        if let Err(e) = result {
            tracing::warn!(property, error = %js_error_message(&e), "style update rejected");
        }
    }

    fn add_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().add_1(class);
    }

    fn remove_class(&self, element: &Element, class: &str) {
        let _ = element.class_list().remove_1(class);
    }

    fn force_reflow(&self, element: &Element) {
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let _ = html.offset_height();
        }
    }

    fn create_element(&self, tag: &str) -> Result<Element, PageHalError> {
        self.document.create_element(tag).map_err(dom_error)
    }

    fn set_element_id(&self, element: &Element, id: &str) {
        element.set_id(id);
    }

    fn append_to_body(&self, element: &Element) -> Result<(), PageHalError> {
        let body = self.document.body().ok_or(PageHalError::NoDocument)?;
        body.append_child(element).map(|_| ()).map_err(dom_error)
    }

    fn remove_element(&self, element: &Element) {
        element.remove();
    }

    fn listen_pointer_events(&self, enabled: bool) -> Result<(), PageHalError> {
        if enabled {
            self.install_listeners()
        } else {
            self.remove_listeners();
            Ok(())
        }
    }

    fn set_timeout(&self, delay_ms: f64, task: Box<dyn FnOnce()>) -> TimerId {
        TimerId(util::set_timeout(delay_ms, task))
    }

    fn clear_timeout(&self, timer: TimerId) {
        util::clear_timeout(timer.0);
    }

    fn post_message(&self, message: &PageMessage) -> Result<(), PageHalError> {
        let json = message
            .to_json()
            .map_err(|e| PageHalError::Broadcast(e.to_string()))?;
        let value = js_sys::JSON::parse(&json).map_err(|e| PageHalError::Broadcast(js_error_message(&e)))?;
        self.window
            .post_message(&value, "*")
            .map_err(|e| PageHalError::Broadcast(js_error_message(&e)))
    }
}
