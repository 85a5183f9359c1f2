//! Shared utilities for the browser realms

use std::io;
use std::time::Duration;

use futures::channel::oneshot;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    /// Console.log binding for WASM
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);

    #[wasm_bindgen(js_name = setTimeout)]
    fn set_timeout_js(handler: &js_sys::Function, timeout_ms: i32) -> i32;

    #[wasm_bindgen(js_name = clearTimeout)]
    fn clear_timeout_js(handle: i32);
}

// === Logging ===

/// Buffers one formatted event and logs it on drop
#[derive(Default)]
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if !self.buf.is_empty() {
            log(String::from_utf8_lossy(&self.buf).trim_end());
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}

/// Install the panic hook and a console subscriber. Safe to call from every
/// entry point; only the first call in a realm installs anything.
pub fn init_tracing(realm: &str) {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // No wall clock on wasm32-unknown-unknown
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(realm, "console logging ready");
    }
}

// === Timers ===

/// Run `callback` once after `delay_ms`. Works in windows and workers.
///
/// A cancelled callback is never freed.
pub fn set_timeout(delay_ms: f64, callback: impl FnOnce() + 'static) -> i32 {
    let callback = Closure::once_into_js(callback);
    set_timeout_js(callback.unchecked_ref(), delay_ms.max(0.0).round() as i32)
}

pub fn clear_timeout(handle: i32) {
    clear_timeout_js(handle);
}

/// Resolve after `duration`
pub async fn sleep(duration: Duration) {
    let (tx, rx) = oneshot::channel::<()>();
    set_timeout(duration.as_secs_f64() * 1000.0, move || {
        let _ = tx.send(());
    });
    let _ = rx.await;
}

// === JSON <-> JsValue ===

pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    js_sys::JSON::parse(&json)
}

pub fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, JsValue> {
    let json: String = js_sys::JSON::stringify(value)?.into();
    serde_json::from_str(&json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse an optional JSON config, falling back to defaults
pub fn parse_config<T: DeserializeOwned + Default>(json: Option<String>) -> Result<T, JsValue> {
    match json {
        Some(json) if !json.trim().is_empty() => {
            serde_json::from_str(&json).map_err(|e| JsValue::from_str(&format!("invalid config: {}", e)))
        }
        _ => Ok(T::default()),
    }
}

/// Best-effort message of a JS exception or rejection
pub fn js_error_message(error: &JsValue) -> String {
    js_sys::Reflect::get(error, &"message".into())
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| error.as_string())
        .unwrap_or_else(|| format!("{:?}", error))
}
