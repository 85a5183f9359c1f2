//! Hop A: background worker
//!
//! Receives popup commands, finds the active tab and forwards them to the
//! tab's content script, injecting it first when the tab has no listener.

use std::time::Duration;

use ab_ipc::{Command, ControllerEvent, Response};
use async_trait::async_trait;
use futures::future::{self, Either};

use crate::{RelayConfig, RelayError};

/// Browser tab identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TabId(pub i32);

/// Platform messaging used by the background hop
#[async_trait(?Send)]
pub trait TabTransport {
    /// Active tab of the current window
    async fn active_tab(&self) -> Result<TabId, RelayError>;

    /// Send a command to the tab's content script and await its reply.
    ///
    /// Must fail with [`RelayError::NoReceiver`] when the tab has no
    /// listener, so the relay knows to inject.
    async fn send_to_tab(&self, tab: TabId, command: &Command) -> Result<Response, RelayError>;

    /// Inject an extension script file into the tab
    async fn inject_content_script(&self, tab: TabId, file: &str) -> Result<(), RelayError>;

    /// Resolve after `duration`
    async fn sleep(&self, duration: Duration);

    /// Broadcast a notification to the extension's controller pages
    async fn notify_controller(&self, event: &ControllerEvent) -> Result<(), RelayError>;
}

/// Background end of the relay
pub struct BackgroundRelay<T: TabTransport> {
    transport: T,
    config: RelayConfig,
}

impl<T: TabTransport> BackgroundRelay<T> {
    pub fn new(transport: T, config: RelayConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Relay one popup command. Never fails: delivery problems produce the
    /// command's fallback response.
    pub async fn handle_command(&self, command: Command) -> Response {
        tracing::debug!(action = command.action(), "relaying command");
        match self.deliver(&command).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(action = command.action(), error = %e, "command delivery failed");
                command.fallback_response(Some(e.to_string()))
            }
        }
    }

    /// Forward a content-realm event to the popup
    pub async fn handle_event(&self, event: ControllerEvent) -> Response {
        match self.transport.notify_controller(&event).await {
            Ok(()) => Response::ok(),
            Err(e) => {
                // The popup may simply be closed
                tracing::warn!(error = %e, "controller notification dropped");
                Response::failed(e.to_string())
            }
        }
    }

    async fn deliver(&self, command: &Command) -> Result<Response, RelayError> {
        let tab = self.transport.active_tab().await?;
        match self.send(tab, command).await {
            Err(RelayError::NoReceiver) => {
                tracing::info!(tab = tab.0, "content script missing, injecting");
                self.transport
                    .inject_content_script(tab, &self.config.content_script)
                    .await?;
                self.transport
                    .sleep(Duration::from_millis(self.config.settle_interval_ms))
                    .await;
                self.send(tab, command).await
            }
            other => other,
        }
    }

    /// One delivery attempt, bounded by the reply timeout
    async fn send(&self, tab: TabId, command: &Command) -> Result<Response, RelayError> {
        let reply = self.transport.send_to_tab(tab, command);
        let timeout = self
            .transport
            .sleep(Duration::from_millis(self.config.reply_timeout_ms));
        match future::select(reply, timeout).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(RelayError::Timeout(self.config.reply_timeout_ms)),
        }
    }
}
