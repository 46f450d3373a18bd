//! Animation error types

use thiserror::Error;

/// Errors raised by tween construction and channel lookups
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// The channel holds a state of a different value type than requested
    #[error("channel '{channel}' holds a {found}, not a {expected}")]
    TypeMismatch {
        channel: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The channel's state is being driven by the running tick
    #[error("channel '{channel}' is being updated by the running tick")]
    Busy { channel: String },

    /// Duration was negative or not finite
    #[error("invalid tween duration: {0}")]
    InvalidDuration(f32),

    /// Speed was zero, negative or not finite
    #[error("invalid tween speed: {0}")]
    InvalidSpeed(f32),

    /// Start time was not finite
    #[error("invalid tween start time: {0}")]
    InvalidTime(f32),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, TweenError>;
