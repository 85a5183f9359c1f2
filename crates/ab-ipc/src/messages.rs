//! Command, response and broadcast message types

use serde::{Deserialize, Serialize};

use crate::{AnimationData, ProtocolError, TargetElement};

// =============================================================================
// Hop A: extension runtime messages
// =============================================================================

/// Command sent by the controller toward the page.
///
/// Serialized as `{"action": "<name>", ...payload}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    StartElementSelection,
    StopElementSelection,
    /// `element_id` carries a selector string, not a [`TargetElement::id`]
    #[serde(rename_all = "camelCase")]
    AnimateElement {
        element_id: String,
        animation: AnimationData,
    },
    #[serde(rename_all = "camelCase")]
    ResetElement { element_id: String },
    GetPageElements,
}

impl Command {
    /// Action name as it appears on the wire
    pub fn action(&self) -> &'static str {
        match self {
            Command::StartElementSelection => crate::ACTION_START_SELECTION,
            Command::StopElementSelection => crate::ACTION_STOP_SELECTION,
            Command::AnimateElement { .. } => crate::ACTION_ANIMATE,
            Command::ResetElement { .. } => crate::ACTION_RESET,
            Command::GetPageElements => crate::ACTION_GET_PAGE_ELEMENTS,
        }
    }

    /// Whether the sender waits for a payload-bearing reply.
    ///
    /// Only `getPageElements` does; everything else is fire-and-forget.
    pub fn expects_reply(&self) -> bool {
        matches!(self, Command::GetPageElements)
    }

    /// Response used when the command cannot be delivered.
    pub fn fallback_response(&self, error: Option<String>) -> Response {
        match self {
            Command::GetPageElements => Response::Elements(PageElements::default()),
            _ => Response::Ack(CommandAck {
                success: false,
                error,
            }),
        }
    }
}

/// Acknowledgement for fire-and-forget commands.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to `getPageElements`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageElements {
    pub elements: Vec<TargetElement>,
}

/// Any reply travelling back toward the controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Elements(PageElements),
    Ack(CommandAck),
}

impl Response {
    /// Successful acknowledgement
    pub fn ok() -> Self {
        Response::Ack(CommandAck {
            success: true,
            error: None,
        })
    }

    /// Failed acknowledgement with a reason
    pub fn failed(error: impl Into<String>) -> Self {
        Response::Ack(CommandAck {
            success: false,
            error: Some(error.into()),
        })
    }

    /// True for a successful ack or any element list
    pub fn is_success(&self) -> bool {
        match self {
            Response::Ack(ack) => ack.success,
            Response::Elements(_) => true,
        }
    }

    /// Element list carried by the reply (empty for acks)
    pub fn into_elements(self) -> Vec<TargetElement> {
        match self {
            Response::Elements(page) => page.elements,
            Response::Ack(_) => Vec::new(),
        }
    }
}

/// Notification flowing from the page toward the controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ControllerEvent {
    ElementSelected { element: TargetElement },
}

/// Anything the background realm can receive on the runtime channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuntimeMessage {
    Command(Command),
    Event(ControllerEvent),
}

impl RuntimeMessage {
    /// Decode a runtime message from JSON
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// Hop B: in-page broadcast messages
// =============================================================================

/// Message exchanged through `window.postMessage` between the content script
/// and the injected script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageMessage {
    #[serde(rename = "ANIMATION_BUILDER_START_SELECTION")]
    StartSelection,
    #[serde(rename = "ANIMATION_BUILDER_STOP_SELECTION")]
    StopSelection,
    #[serde(rename = "ANIMATION_BUILDER_ANIMATE", rename_all = "camelCase")]
    Animate {
        element_id: String,
        animation: AnimationData,
    },
    #[serde(rename = "ANIMATION_BUILDER_RESET", rename_all = "camelCase")]
    Reset { element_id: String },
    #[serde(rename = "ELEMENT_SELECTED")]
    ElementSelected { element: TargetElement },
}

impl PageMessage {
    /// Broadcast equivalent of a runtime command.
    ///
    /// Returns `None` for `getPageElements`, which the content realm answers
    /// itself.
    pub fn from_command(cmd: &Command) -> Option<Self> {
        match cmd {
            Command::StartElementSelection => Some(PageMessage::StartSelection),
            Command::StopElementSelection => Some(PageMessage::StopSelection),
            Command::AnimateElement {
                element_id,
                animation,
            } => Some(PageMessage::Animate {
                element_id: element_id.clone(),
                animation: animation.clone(),
            }),
            Command::ResetElement { element_id } => Some(PageMessage::Reset {
                element_id: element_id.clone(),
            }),
            Command::GetPageElements => None,
        }
    }

    /// The `type` tag of this message
    pub fn type_tag(&self) -> &'static str {
        match self {
            PageMessage::StartSelection => crate::MSG_START_SELECTION,
            PageMessage::StopSelection => crate::MSG_STOP_SELECTION,
            PageMessage::Animate { .. } => crate::MSG_ANIMATE,
            PageMessage::Reset { .. } => crate::MSG_RESET,
            PageMessage::ElementSelected { .. } => crate::MSG_ELEMENT_SELECTED,
        }
    }

    /// Decode a broadcast payload.
    ///
    /// Pages post their own messages on the same channel, so callers should
    /// treat errors as "not for us" rather than failures.
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode for `postMessage`
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}
