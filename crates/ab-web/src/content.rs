//! Content-script entry point
//!
//! Runs in the extension's isolated world. Loads the page-realm script,
//! answers runtime commands through [`ContentRelay`] and forwards
//! selection broadcasts to the background worker.

use std::rc::Rc;

use ab_ipc::{Command, ControllerEvent};
use ab_page::PageConfig;
use ab_relay::{ContentRelay, RelayConfig, RelayError, RuntimePort};
use async_trait::async_trait;
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, MessageEvent};

use crate::chrome::{self, MessageListener};
use crate::util::{self, init_tracing, js_error_message};
use crate::WebPage;

/// Runtime channel toward the background worker
pub struct RuntimeChannel;

#[async_trait(?Send)]
impl RuntimePort for RuntimeChannel {
    async fn send_event(&self, event: &ControllerEvent) -> Result<(), RelayError> {
        let message = util::to_js(event).map_err(|e| RelayError::Transport(js_error_message(&e)))?;
        chrome::send_runtime(&message).await?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentOptions {
    page: PageConfig,
    relay: RelayConfig,
}

#[wasm_bindgen]
pub struct ContentScript {
    page: Rc<WebPage>,
    on_runtime: MessageListener,
    on_message: Closure<dyn FnMut(MessageEvent)>,
}

#[wasm_bindgen]
impl ContentScript {
    /// `config_json` may carry `{"page": {...}, "relay": {...}}` overrides
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<ContentScript, JsValue> {
        init_tracing("content");
        let options: ContentOptions = util::parse_config(config_json)?;
        let page = Rc::new(WebPage::new().map_err(|e| JsValue::from_str(&e.to_string()))?);

        inject_page_script(&page, &options.relay.injected_script)?;

        let relay = Rc::new(ContentRelay::new(Rc::clone(&page), RuntimeChannel, options.page));

        let commands = Rc::clone(&relay);
        let on_runtime: MessageListener = Closure::new(
            move |message: JsValue, _sender: JsValue, send_response: js_sys::Function| {
                let Ok(command) = util::from_js::<Command>(&message) else {
                    return JsValue::FALSE;
                };
                let response = commands.handle_command(&command);
                match util::to_js(&response) {
                    Ok(reply) => chrome::respond(&send_response, &reply),
                    Err(e) => tracing::error!(error = %js_error_message(&e), "failed to encode response"),
                }
                JsValue::FALSE
            },
        );
        chrome::on_message_add_listener(on_runtime.as_ref().unchecked_ref());

        let window = page.window().clone();
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
            let relay = Rc::clone(&relay);
            wasm_bindgen_futures::spawn_local(async move {
                relay.handle_page_json(&json).await;
            });
        });
        page.window()
            .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())?;

        tracing::info!("animation builder content script ready");
        Ok(Self {
            page,
            on_runtime,
            on_message,
        })
    }
}

impl Drop for ContentScript {
    fn drop(&mut self) {
        chrome::on_message_remove_listener(self.on_runtime.as_ref().unchecked_ref());
        let _ = self
            .page
            .window()
            .remove_event_listener_with_callback("message", self.on_message.as_ref().unchecked_ref());
    }
}

/// Add the page-realm `<script>` once per document
fn inject_page_script(page: &WebPage, file: &str) -> Result<(), JsValue> {
    let document = page.document();
    let existing = format!("script[src*=\"{}\"]", file);
    if document.query_selector(&existing)?.is_some() {
        tracing::debug!(file, "page script already present");
        return Ok(());
    }

    let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
    script.set_src(&chrome::runtime_get_url(file));
    let parent = match document.head() {
        Some(head) => head.unchecked_into::<web_sys::Element>(),
        None => document
            .document_element()
            .ok_or_else(|| JsValue::from_str("document has no root element"))?,
    };
    parent.append_child(&script)?;
    tracing::debug!(file, "page script injected");
    Ok(())
}
