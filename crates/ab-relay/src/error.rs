//! Relay errors

use ab_hal::PageHalError;
use ab_ipc::ProtocolError;
use thiserror::Error;

/// Failure while moving a message between realms.
///
/// Hops convert these into default responses; they are only ever logged.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No active tab in the current window
    #[error("no active tab")]
    NoActiveTab,
    /// The tab has no listener for runtime messages yet
    #[error("no receiving end in tab")]
    NoReceiver,
    /// The browser refused to inject the content script
    #[error("script injection failed: {0}")]
    InjectionFailed(String),
    /// The reply did not arrive in time
    #[error("no reply within {0} ms")]
    Timeout(u64),
    /// Any other platform messaging failure
    #[error("transport error: {0}")]
    Transport(String),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Page(#[from] PageHalError),
}
