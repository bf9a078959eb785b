//! Error types for dispatch.

use oxide_pattern::PatternError;
use thiserror::Error;

/// Errors surfaced by [`invoke`](crate::invoke).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No route matched the message.
    #[error("no route matched: {method} {value}")]
    NoRouteMatched { method: String, value: String },

    /// A route pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// A completion callback was misused.
    #[error(transparent)]
    SyncProtocol(#[from] SyncProtocolError),

    /// A handler failed.
    #[error("handler failed: {0}")]
    Handler(Box<dyn std::error::Error + Send + Sync>),

    /// A nested unit of execution was cancelled before completing.
    #[error("unit of execution aborted: {0}")]
    Aborted(String),
}

impl DispatchError {
    /// Wraps an arbitrary handler error.
    pub fn handler(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Handler(err.into())
    }
}

/// Misuse of a [`Done`](crate::Done) completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncProtocolError {
    /// The callback was completed a second time.
    #[error("completion callback invoked more than once")]
    AlreadyCompleted,

    /// Every copy of the callback was dropped without completing.
    #[error("completion callback dropped without being invoked")]
    Abandoned,
}

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
