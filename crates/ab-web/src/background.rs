//! Service-worker entry point

use std::rc::Rc;
use std::time::Duration;

use ab_ipc::{Command, ControllerEvent, Response, RuntimeMessage};
use ab_relay::{BackgroundRelay, RelayConfig, RelayError, TabId, TabTransport};
use async_trait::async_trait;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::chrome::{self, MessageListener};
use crate::util::{self, init_tracing, js_error_message};

/// [`TabTransport`] over `chrome.tabs` and `chrome.scripting`
pub struct ChromeTabs;

fn encode<T: serde::Serialize>(value: &T) -> Result<JsValue, RelayError> {
    util::to_js(value).map_err(|e| RelayError::Transport(js_error_message(&e)))
}

#[async_trait(?Send)]
impl TabTransport for ChromeTabs {
    async fn active_tab(&self) -> Result<TabId, RelayError> {
        chrome::active_tab()
            .await?
            .map(TabId)
            .ok_or(RelayError::NoActiveTab)
    }

    async fn send_to_tab(&self, tab: TabId, command: &Command) -> Result<Response, RelayError> {
        let reply = chrome::send_to_tab(tab.0, &encode(command)?).await?;
        if reply.is_undefined() || reply.is_null() {
            // Content scripts only stay silent for commands nobody awaits
            return if command.expects_reply() {
                Err(RelayError::Transport("empty reply".to_string()))
            } else {
                Ok(Response::ok())
            };
        }
        util::from_js(&reply).map_err(|e| RelayError::Transport(js_error_message(&e)))
    }

    async fn inject_content_script(&self, tab: TabId, file: &str) -> Result<(), RelayError> {
        chrome::execute_script(tab.0, file).await
    }

    async fn sleep(&self, duration: Duration) {
        util::sleep(duration).await;
    }

    async fn notify_controller(&self, event: &ControllerEvent) -> Result<(), RelayError> {
        chrome::send_runtime(&encode(event)?).await?;
        Ok(())
    }
}

#[wasm_bindgen]
pub struct BackgroundWorker {
    on_runtime: MessageListener,
}

#[wasm_bindgen]
impl BackgroundWorker {
    /// `config_json` is an optional partial relay config
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<BackgroundWorker, JsValue> {
        init_tracing("background");
        let config: RelayConfig = util::parse_config(config_json)?;
        let relay = Rc::new(BackgroundRelay::new(ChromeTabs, config));

        let on_runtime: MessageListener = Closure::new(
            move |message: JsValue, sender: JsValue, send_response: js_sys::Function| {
                let Ok(message) = util::from_js::<RuntimeMessage>(&message) else {
                    return JsValue::FALSE;
                };
                let from_tab = chrome::sent_from_tab(&sender);
                let relay = Rc::clone(&relay);
                match message {
                    // Commands come from the popup, events from content scripts
                    RuntimeMessage::Command(command) if !from_tab => {
                        wasm_bindgen_futures::spawn_local(async move {
                            let response = relay.handle_command(command).await;
                            reply(&send_response, &response);
                        });
                    }
                    RuntimeMessage::Event(event) if from_tab => {
                        wasm_bindgen_futures::spawn_local(async move {
                            let response = relay.handle_event(event).await;
                            reply(&send_response, &response);
                        });
                    }
                    _ => return JsValue::FALSE,
                }
                // Keep the channel open for the async reply
                JsValue::TRUE
            },
        );
        chrome::on_message_add_listener(on_runtime.as_ref().unchecked_ref());

        tracing::info!("animation builder background worker ready");
        Ok(Self { on_runtime })
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        chrome::on_message_remove_listener(self.on_runtime.as_ref().unchecked_ref());
    }
}

fn reply(send_response: &js_sys::Function, response: &Response) {
    match util::to_js(response) {
        Ok(value) => chrome::respond(send_response, &value),
        Err(e) => tracing::error!(error = %js_error_message(&e), "failed to encode response"),
    }
}
