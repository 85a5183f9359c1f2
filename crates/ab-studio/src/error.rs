//! Studio errors

use thiserror::Error;

/// Errors from store edits and studio operations
#[derive(Clone, Debug, Error, PartialEq)]
pub enum StudioError {
    #[error("unknown animation: {0}")]
    UnknownAnimation(String),
    #[error("unknown element: {0}")]
    UnknownElement(String),
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    #[error("animation already exists: {0}")]
    DuplicateAnimation(String),
    /// Duration must be finite and positive, delay finite and non-negative
    #[error("invalid timing: duration {duration}, delay {delay}")]
    InvalidTiming { duration: f64, delay: f64 },
    /// Nothing to attach an animation to
    #[error("no elements selected")]
    NoTargets,
}
