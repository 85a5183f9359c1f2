//! Hop B: content script
//!
//! Translates runtime commands into in-page broadcasts for the injected
//! script and answers `getPageElements` itself by scanning the document.
//! `ELEMENT_SELECTED` broadcasts from the page go back out as runtime
//! events.

use std::rc::Rc;

use ab_hal::PageHal;
use ab_ipc::{Command, ControllerEvent, PageElements, PageMessage, Response};
use ab_page::{scan_page, PageConfig};
use async_trait::async_trait;

use crate::RelayError;

/// Runtime channel from the content realm toward the background worker
#[async_trait(?Send)]
pub trait RuntimePort {
    async fn send_event(&self, event: &ControllerEvent) -> Result<(), RelayError>;
}

/// Content end of the relay
pub struct ContentRelay<H: PageHal, R: RuntimePort> {
    hal: Rc<H>,
    runtime: R,
    page_config: PageConfig,
}

impl<H: PageHal, R: RuntimePort> ContentRelay<H, R> {
    pub fn new(hal: Rc<H>, runtime: R, page_config: PageConfig) -> Self {
        Self {
            hal,
            runtime,
            page_config,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Answer one runtime command
    pub fn handle_command(&self, command: &Command) -> Response {
        tracing::debug!(action = command.action(), "content received command");

        let Some(message) = PageMessage::from_command(command) else {
            let elements = scan_page(&*self.hal, &self.page_config);
            tracing::debug!(count = elements.len(), "answering getPageElements");
            return Response::Elements(PageElements { elements });
        };

        match self.hal.post_message(&message) {
            Ok(()) => Response::ok(),
            Err(e) => {
                tracing::error!(kind = message.type_tag(), error = %e, "broadcast failed");
                Response::failed(e.to_string())
            }
        }
    }

    /// Handle a broadcast observed on the page channel.
    ///
    /// Only `ELEMENT_SELECTED` is forwarded; returns whether anything was
    /// sent.
    pub async fn handle_page_message(&self, message: PageMessage) -> bool {
        let PageMessage::ElementSelected { element } = message else {
            return false;
        };
        let event = ControllerEvent::ElementSelected { element };
        if let Err(e) = self.runtime.send_event(&event).await {
            tracing::error!(error = %e, "failed to forward selection");
            return false;
        }
        true
    }

    /// Decode and handle a raw broadcast payload; foreign payloads are
    /// ignored.
    pub async fn handle_page_json(&self, json: &str) -> bool {
        match PageMessage::from_json(json) {
            Ok(message) => self.handle_page_message(message).await,
            Err(_) => false,
        }
    }
}
