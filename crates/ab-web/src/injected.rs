//! Page-realm entry point
//!
//! Loaded through a `<script>` tag so it shares the page's JavaScript
//! realm. Hosts the [`PageAgent`] and feeds it broadcast messages and
//! pointer events.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ab_hal::{PointerDisposition, PointerEvent};
use ab_page::{PageAgent, PageConfig, SelectionState};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, MessageEvent};

use crate::util::{self, init_tracing};
use crate::WebPage;

#[wasm_bindgen]
pub struct InjectedScript {
    page: Rc<WebPage>,
    agent: Rc<RefCell<PageAgent<WebPage>>>,
    on_message: Closure<dyn FnMut(MessageEvent)>,
}

#[wasm_bindgen]
impl InjectedScript {
    /// Start listening on the window channel. `config_json` is an optional
    /// partial page config.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<InjectedScript, JsValue> {
        init_tracing("injected");
        let config: PageConfig = util::parse_config(config_json)?;
        let page = Rc::new(WebPage::new().map_err(|e| JsValue::from_str(&e.to_string()))?);
        let agent = Rc::new(RefCell::new(PageAgent::new(Rc::clone(&page), config)));

        let weak: Weak<RefCell<PageAgent<WebPage>>> = Rc::downgrade(&agent);
        page.set_pointer_sink(Rc::new(move |event: PointerEvent<Element>| {
            let Some(agent) = weak.upgrade() else {
                return PointerDisposition::default();
            };
            let Ok(mut agent) = agent.try_borrow_mut() else {
                return PointerDisposition::default();
            };
            agent.on_pointer(event)
        }));

        let window = page.window().clone();
        let weak = Rc::downgrade(&agent);
        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let from_self = event
                .source()
                .map(|source| JsValue::from(source) == JsValue::from(window.clone()))
                .unwrap_or(false);
            if !from_self {
                return;
            }
            let Some(json) = js_sys::JSON::stringify(&event.data())
                .ok()
                .and_then(|json| json.as_string())
            else {
                return;
            };
            if let Some(agent) = weak.upgrade() {
                if let Ok(mut agent) = agent.try_borrow_mut() {
                    agent.handle_json(&json);
                }
            }
        });
        page.window()
            .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())?;

        tracing::info!("animation builder page agent ready");
        Ok(Self {
            page,
            agent,
            on_message,
        })
    }

    /// Whether a click selection is in progress
    #[wasm_bindgen(getter, js_name = isSelecting)]
    pub fn is_selecting(&self) -> bool {
        self.agent.borrow().selection_state() == SelectionState::Selecting
    }
}

impl Drop for InjectedScript {
    fn drop(&mut self) {
        let _ = self
            .page
            .window()
            .remove_event_listener_with_callback("message", self.on_message.as_ref().unchecked_ref());
    }
}
