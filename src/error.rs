use serde::Serialize;
use thiserror::Error;

/// Errors raised while binding a session to a stream destination
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No stream destination was supplied (or it was blank)
    #[error("stream target is empty")]
    EmptyTarget,

    /// The publishing capability could not be constructed
    #[error("failed to build publisher: {0}")]
    Capability(String),
}

/// Errors raised when a command is issued in a state that cannot serve it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidStateError {
    #[error("session is not initialized")]
    NotInitialized,
}

/// Reported alongside the `Failed` transition when the capability could not connect.
///
/// There is no automatic retry; the caller re-issues `toggle_publish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("failed to connect to {target}")]
pub struct CapabilityFailure {
    pub target: String,
}

/// Any error a caller of the session controller may see
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),

    #[error("capture permission denied")]
    PermissionDenied,
}
