//! Extension API bindings
//!
//! Thin promise-based wrappers over `chrome.tabs`, `chrome.scripting` and
//! `chrome.runtime` (Manifest V3).

use ab_relay::RelayError;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::util::js_error_message;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = query)]
    fn tabs_query(query: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "tabs"], js_name = sendMessage)]
    fn tabs_send_message(tab_id: i32, message: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "scripting"], js_name = executeScript)]
    fn scripting_execute_script(injection: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "runtime"], js_name = sendMessage)]
    fn runtime_send_message(message: &JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getURL)]
    pub fn runtime_get_url(path: &str) -> String;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = addListener)]
    pub fn on_message_add_listener(listener: &js_sys::Function);

    #[wasm_bindgen(js_namespace = ["chrome", "runtime", "onMessage"], js_name = removeListener)]
    pub fn on_message_remove_listener(listener: &js_sys::Function);
}

/// Listener shape for `chrome.runtime.onMessage`: `(message, sender,
/// sendResponse) -> keepChannelOpen`
pub type MessageListener = Closure<dyn FnMut(JsValue, JsValue, js_sys::Function) -> JsValue>;

/// Chrome reports a tab without a listener through this rejection text
const NO_RECEIVER: &str = "Receiving end does not exist";

fn classify(error: JsValue) -> RelayError {
    let message = js_error_message(&error);
    if message.contains(NO_RECEIVER) {
        RelayError::NoReceiver
    } else {
        RelayError::Transport(message)
    }
}

/// Id of the active tab in the current window
pub async fn active_tab() -> Result<Option<i32>, RelayError> {
    let query = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&query, &"active".into(), &JsValue::TRUE);
    let _ = js_sys::Reflect::set(&query, &"currentWindow".into(), &JsValue::TRUE);

    let tabs = JsFuture::from(tabs_query(&query).map_err(classify)?)
        .await
        .map_err(classify)?;
    let first = js_sys::Array::from(&tabs).get(0);
    if first.is_undefined() {
        return Ok(None);
    }
    Ok(js_sys::Reflect::get(&first, &"id".into())
        .ok()
        .and_then(|id| id.as_f64())
        .map(|id| id as i32))
}

pub async fn send_to_tab(tab_id: i32, message: &JsValue) -> Result<JsValue, RelayError> {
    let promise = tabs_send_message(tab_id, message).map_err(classify)?;
    JsFuture::from(promise).await.map_err(classify)
}

/// Inject an extension file into the top frame of `tab_id`
pub async fn execute_script(tab_id: i32, file: &str) -> Result<(), RelayError> {
    let target = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&target, &"tabId".into(), &tab_id.into());
    let injection = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&injection, &"target".into(), &target);
    let _ = js_sys::Reflect::set(
        &injection,
        &"files".into(),
        &js_sys::Array::of1(&JsValue::from_str(file)),
    );

    let injection_failed = |e: JsValue| RelayError::InjectionFailed(js_error_message(&e));
    let promise = scripting_execute_script(&injection).map_err(injection_failed)?;
    JsFuture::from(promise).await.map_err(injection_failed)?;
    Ok(())
}

pub async fn send_runtime(message: &JsValue) -> Result<JsValue, RelayError> {
    let promise = runtime_send_message(message).map_err(classify)?;
    JsFuture::from(promise).await.map_err(classify)
}

/// Whether a runtime message came from a tab (content script) rather than
/// an extension page
pub fn sent_from_tab(sender: &JsValue) -> bool {
    js_sys::Reflect::get(sender, &"tab".into())
        .map(|tab| !tab.is_undefined())
        .unwrap_or(false)
}

/// Reply through a `sendResponse` callback
pub fn respond(send_response: &js_sys::Function, response: &JsValue) {
    if let Err(e) = send_response.call1(&JsValue::NULL, response) {
        tracing::warn!(error = %js_error_message(&e), "sendResponse failed");
    }
}
