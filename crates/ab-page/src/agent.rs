//! In-page dispatcher
//!
//! The agent owns the selector engine and the executor and is the only
//! consumer of broadcast commands inside the page realm.

use std::rc::Rc;

use ab_hal::{PageHal, PointerDisposition, PointerEvent};
use ab_ipc::PageMessage;

use crate::{AnimationExecutor, PageConfig, SelectionState, SelectorEngine};

/// Page-realm endpoint of the broadcast channel
pub struct PageAgent<H: PageHal> {
    hal: Rc<H>,
    engine: SelectorEngine<H>,
    executor: AnimationExecutor<H>,
}

impl<H: PageHal> PageAgent<H> {
    pub fn new(hal: Rc<H>, config: PageConfig) -> Self {
        let executor = AnimationExecutor::new(Rc::clone(&hal), config.slide_distance_px);
        let engine = SelectorEngine::new(Rc::clone(&hal), config);
        Self {
            hal,
            engine,
            executor,
        }
    }

    /// Dispatch one broadcast message.
    ///
    /// Failures are logged; nothing is sent back over the channel.
    pub fn handle_message(&mut self, message: PageMessage) {
        match message {
            PageMessage::StartSelection => {
                if let Err(e) = self.engine.start() {
                    tracing::error!(error = %e, "failed to start selection");
                }
            }
            PageMessage::StopSelection => self.engine.stop(),
            PageMessage::Animate {
                element_id,
                animation,
            } => {
                if let Err(e) = self.executor.animate(&element_id, &animation) {
                    tracing::warn!(selector = %element_id, error = %e, "animate failed");
                }
            }
            PageMessage::Reset { element_id } => {
                if let Err(e) = self.executor.reset(&element_id) {
                    tracing::warn!(selector = %element_id, error = %e, "reset failed");
                }
            }
            // Our own notification, echoed back by the shared channel
            PageMessage::ElementSelected { .. } => {}
        }
    }

    /// Decode and dispatch a raw broadcast payload.
    ///
    /// Returns `false` for payloads that are not ours; pages use the same
    /// channel for their own traffic.
    pub fn handle_json(&mut self, json: &str) -> bool {
        match PageMessage::from_json(json) {
            Ok(message) => {
                self.handle_message(message);
                true
            }
            Err(_) => false,
        }
    }

    /// Feed a pointer event captured by the backend's listeners.
    ///
    /// A completed selection is broadcast as `ELEMENT_SELECTED`.
    pub fn on_pointer(&mut self, event: PointerEvent<H::Element>) -> PointerDisposition {
        let outcome = self.engine.handle_pointer(event);
        if let Some(element) = outcome.selected {
            let message = PageMessage::ElementSelected { element };
            if let Err(e) = self.hal.post_message(&message) {
                tracing::error!(error = %e, "failed to broadcast selection");
            }
        }
        outcome.disposition
    }

    pub fn selection_state(&self) -> SelectionState {
        self.engine.state()
    }

    pub fn executor(&self) -> &AnimationExecutor<H> {
        &self.executor
    }

    pub fn hal(&self) -> &Rc<H> {
        &self.hal
    }
}
