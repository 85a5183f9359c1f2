//! Cross-realm relay for Animation Builder
//!
//! Commands from the popup travel through three realms:
//!
//! ```text
//! popup --runtime--> background --tabs--> content --postMessage--> injected
//!                    (BackgroundRelay)     (ContentRelay)          (PageAgent)
//! ```
//!
//! Selections travel the other way as `ELEMENT_SELECTED` broadcasts, then
//! `elementSelected` runtime events.
//!
//! Each hop is a pure forwarder. Delivery problems are logged and answered
//! with a default [`ab_ipc::Response`]; a [`RelayError`] never leaves a hop.
//! Platform messaging is abstracted behind [`TabTransport`] and
//! [`RuntimePort`] so both hops run unchanged under test.

mod background;
mod config;
mod content;
mod error;

pub use background::{BackgroundRelay, TabId, TabTransport};
pub use config::RelayConfig;
pub use content::{ContentRelay, RuntimePort};
pub use error::RelayError;
