//! Popup entry point
//!
//! [`PopupController`] is the JavaScript face of the [`Studio`]. The popup
//! UI calls its methods and re-renders from the state passed to the
//! change callback.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use ab_ipc::{AnimationData, Command, CommandAck, ControllerEvent, Response, TargetElement};
use ab_relay::RelayError;
use ab_studio::{
    presets, AnimationRequest, AnimationUpdate, ExportFormat, PageLink, Studio, StudioConfig,
    TimerHandle, TimerHost,
};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;

use crate::chrome::{self, MessageListener};
use crate::util::{self, init_tracing, js_error_message};

/// [`PageLink`] through the background worker
pub struct RuntimeLink;

impl RuntimeLink {
    async fn send(&self, command: &Command) -> Result<Response, RelayError> {
        let message = util::to_js(command).map_err(|e| RelayError::Transport(js_error_message(&e)))?;
        let reply = chrome::send_runtime(&message).await?;
        util::from_js(&reply).map_err(|e| RelayError::Transport(js_error_message(&e)))
    }

    async fn acknowledge(&self, command: Command) -> CommandAck {
        match self.send(&command).await {
            Ok(Response::Ack(ack)) => ack,
            Ok(Response::Elements(_)) => CommandAck {
                success: true,
                error: None,
            },
            Err(e) => {
                tracing::warn!(action = command.action(), error = %e, "command not delivered");
                CommandAck {
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[async_trait(?Send)]
impl PageLink for RuntimeLink {
    async fn start_element_selection(&self) -> CommandAck {
        self.acknowledge(Command::StartElementSelection).await
    }

    async fn stop_element_selection(&self) -> CommandAck {
        self.acknowledge(Command::StopElementSelection).await
    }

    async fn animate_element(&self, selector: &str, animation: &AnimationData) -> CommandAck {
        self.acknowledge(Command::AnimateElement {
            element_id: selector.to_string(),
            animation: animation.clone(),
        })
        .await
    }

    async fn reset_element(&self, selector: &str) -> CommandAck {
        self.acknowledge(Command::ResetElement {
            element_id: selector.to_string(),
        })
        .await
    }

    async fn page_elements(&self) -> Vec<TargetElement> {
        match self.send(&Command::GetPageElements).await {
            Ok(response) => response.into_elements(),
            Err(e) => {
                tracing::warn!(error = %e, "page scan failed");
                Vec::new()
            }
        }
    }
}

/// [`TimerHost`] over `setTimeout`
#[derive(Default)]
pub struct WebTimers {
    next: Cell<u64>,
    pending: Rc<RefCell<HashMap<u64, i32>>>,
}

impl TimerHost for WebTimers {
    fn schedule(&self, delay: Duration, task: LocalBoxFuture<'static, ()>) -> TimerHandle {
        let handle = self.next.get();
        self.next.set(handle + 1);

        let pending = Rc::clone(&self.pending);
        let js_id = util::set_timeout(delay.as_secs_f64() * 1000.0, move || {
            pending.borrow_mut().remove(&handle);
            wasm_bindgen_futures::spawn_local(task);
        });
        self.pending.borrow_mut().insert(handle, js_id);
        TimerHandle(handle)
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(js_id) = self.pending.borrow_mut().remove(&handle.0) {
            util::clear_timeout(js_id);
        }
    }
}

struct Shared {
    studio: Studio<RuntimeLink, WebTimers>,
    on_change: RefCell<Option<js_sys::Function>>,
    finish_timer: Cell<Option<i32>>,
}

impl Shared {
    fn notify(&self) {
        let Some(callback) = self.on_change.borrow().clone() else {
            return;
        };
        match util::to_js(&self.studio.state()) {
            Ok(state) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &state) {
                    tracing::warn!(error = %js_error_message(&e), "change callback threw");
                }
            }
            Err(e) => tracing::error!(error = %js_error_message(&e), "failed to encode state"),
        }
    }

    fn clear_finish_timer(&self) {
        if let Some(id) = self.finish_timer.take() {
            util::clear_timeout(id);
        }
    }
}

fn studio_error(error: ab_studio::StudioError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen]
pub struct PopupController {
    shared: Rc<Shared>,
    on_runtime: MessageListener,
}

#[wasm_bindgen]
impl PopupController {
    /// `config_json` is an optional partial studio config
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<PopupController, JsValue> {
        init_tracing("popup");
        let config: StudioConfig = util::parse_config(config_json)?;
        let shared = Rc::new(Shared {
            studio: Studio::new(Rc::new(RuntimeLink), WebTimers::default(), config),
            on_change: RefCell::new(None),
            finish_timer: Cell::new(None),
        });

        let weak = Rc::downgrade(&shared);
        let on_runtime: MessageListener = Closure::new(
            move |message: JsValue, sender: JsValue, _send_response: js_sys::Function| {
                // Content scripts broadcast to every extension page; only
                // take the copy forwarded by the background worker
                if chrome::sent_from_tab(&sender) {
                    return JsValue::FALSE;
                }
                let Ok(event) = util::from_js::<ControllerEvent>(&message) else {
                    return JsValue::FALSE;
                };
                if let Some(shared) = weak.upgrade() {
                    if shared.studio.handle_event(event) {
                        shared.notify();
                    }
                }
                JsValue::FALSE
            },
        );
        chrome::on_message_add_listener(on_runtime.as_ref().unchecked_ref());

        Ok(Self { shared, on_runtime })
    }

    /// Register `callback(state)`, called after every state change
    #[wasm_bindgen(js_name = setOnChange)]
    pub fn set_on_change(&self, callback: Option<js_sys::Function>) {
        *self.shared.on_change.borrow_mut() = callback;
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        util::to_js(&self.shared.studio.state())
    }

    pub fn presets(&self) -> Result<JsValue, JsValue> {
        util::to_js(&presets::presets())
    }

    pub fn easings(&self) -> Result<JsValue, JsValue> {
        util::to_js(&presets::easings())
    }

    #[wasm_bindgen(getter, js_name = isSelecting)]
    pub fn is_selecting(&self) -> bool {
        self.shared.studio.is_selecting()
    }

    // === Page interaction ===

    /// Rescan the page. Resolves to the element list.
    #[wasm_bindgen(js_name = pageElements)]
    pub fn page_elements(&self) -> js_sys::Promise {
        let shared = Rc::clone(&self.shared);
        future_to_promise(async move {
            let elements = shared.studio.load_page_elements().await;
            util::to_js(&elements)
        })
    }

    #[wasm_bindgen(js_name = startSelection)]
    pub fn start_selection(&self) -> js_sys::Promise {
        let shared = Rc::clone(&self.shared);
        future_to_promise(async move {
            let ack = shared.studio.start_selection().await;
            shared.notify();
            util::to_js(&ack)
        })
    }

    #[wasm_bindgen(js_name = stopSelection)]
    pub fn stop_selection(&self) -> js_sys::Promise {
        let shared = Rc::clone(&self.shared);
        future_to_promise(async move {
            let ack = shared.studio.stop_selection().await;
            shared.notify();
            util::to_js(&ack)
        })
    }

    /// Add an element from the scanned list; returns whether it was new
    #[wasm_bindgen(js_name = selectElement)]
    pub fn select_element(&self, element: JsValue) -> Result<bool, JsValue> {
        let element: TargetElement = util::from_js(&element)?;
        let added = self.shared.studio.on_element_selected(element);
        self.shared.notify();
        Ok(added)
    }

    #[wasm_bindgen(js_name = deselectElement)]
    pub fn deselect_element(&self, id: &str) -> Result<(), JsValue> {
        self.shared.studio.deselect_element(id).map_err(studio_error)?;
        self.shared.notify();
        Ok(())
    }

    #[wasm_bindgen(js_name = clearSelectedElements)]
    pub fn clear_selected_elements(&self) {
        self.shared.studio.clear_selected_elements();
        self.shared.notify();
    }

    // === Editing ===

    /// Create animations from `{presetId, duration?, delay?, easing?,
    /// direction?, target?}`. Resolves to the new ids.
    #[wasm_bindgen(js_name = addAnimation)]
    pub fn add_animation(&self, request: JsValue) -> js_sys::Promise {
        let shared = Rc::clone(&self.shared);
        let request = util::from_js::<AnimationRequest>(&request);
        future_to_promise(async move {
            let ids = shared.studio.add_animation(&request?).await.map_err(studio_error)?;
            shared.notify();
            util::to_js(&ids)
        })
    }

    #[wasm_bindgen(js_name = removeAnimation)]
    pub fn remove_animation(&self, id: &str) -> Result<(), JsValue> {
        self.shared.studio.remove_animation(id).map_err(studio_error)?;
        self.shared.notify();
        Ok(())
    }

    #[wasm_bindgen(js_name = updateAnimation)]
    pub fn update_animation(&self, id: &str, update: JsValue) -> Result<(), JsValue> {
        let update: AnimationUpdate = util::from_js(&update)?;
        self.shared
            .studio
            .update_animation(id, &update)
            .map_err(studio_error)?;
        self.shared.notify();
        Ok(())
    }

    #[wasm_bindgen(js_name = moveTimelineItem)]
    pub fn move_timeline_item(&self, id: &str, start_time: f64) -> Result<(), JsValue> {
        self.shared
            .studio
            .move_timeline_item(id, start_time)
            .map_err(studio_error)?;
        self.shared.notify();
        Ok(())
    }

    /// Replay one animation on the page
    pub fn preview(&self, id: String) -> js_sys::Promise {
        let shared = Rc::clone(&self.shared);
        future_to_promise(async move {
            let ack = shared.studio.preview(&id).await.map_err(studio_error)?;
            util::to_js(&ack)
        })
    }

    // === Playback ===

    /// Start playback. Returns the timeline length in seconds.
    pub fn play(&self) -> f64 {
        let summary = self.shared.studio.play();
        self.shared.clear_finish_timer();
        if summary.scheduled > 0 {
            let weak = Rc::downgrade(&self.shared);
            let id = util::set_timeout(summary.total_duration * 1000.0, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.finish_timer.set(None);
                    shared.studio.playback_finished();
                    shared.notify();
                }
            });
            self.shared.finish_timer.set(Some(id));
        }
        self.shared.notify();
        summary.total_duration
    }

    /// Cancel pending dispatches; returns how many were cancelled
    pub fn stop(&self) -> usize {
        self.shared.clear_finish_timer();
        let cancelled = self.shared.studio.stop();
        self.shared.notify();
        cancelled
    }

    pub fn reset(&self) -> js_sys::Promise {
        self.shared.clear_finish_timer();
        let shared = Rc::clone(&self.shared);
        future_to_promise(async move {
            shared.studio.reset().await;
            shared.notify();
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Export code; `format` is `"framer-motion"` or `"gsap"`
    #[wasm_bindgen(js_name = exportCode)]
    pub fn export_code(&self, format: &str) -> Result<String, JsValue> {
        let format: ExportFormat = serde_json::from_value(serde_json::Value::String(format.to_string()))
            .map_err(|_| JsValue::from_str(&format!("unknown export format: {}", format)))?;
        Ok(self.shared.studio.export(format))
    }
}

impl Drop for PopupController {
    fn drop(&mut self) {
        self.shared.clear_finish_timer();
        chrome::on_message_remove_listener(self.on_runtime.as_ref().unchecked_ref());
    }
}
