//! Protocol decoding errors

use thiserror::Error;

/// Errors raised while decoding a message received from another realm.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Payload was not valid JSON or did not match any known message shape.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Payload was valid but carried a tag this realm does not handle.
    #[error("unexpected message type: {0}")]
    UnexpectedType(String),
}
