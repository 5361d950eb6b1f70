use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::elapsed::ElapsedTime;
use crate::error::CapabilityFailure;
use crate::publisher::PublisherEvent;

/// Where a publishing session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Ready,
    Publishing,
    Stopped,
    Disconnected,
    Failed,
}

impl SessionState {
    pub fn is_initialized(self) -> bool {
        self != SessionState::Uninitialized
    }

    /// User-facing message shown when the session enters this state
    pub fn message(self) -> &'static str {
        match self {
            SessionState::Uninitialized => "Not initialized",
            SessionState::Ready => "Ready to publish",
            SessionState::Publishing => "Started publishing",
            SessionState::Stopped => "Stopped publishing",
            SessionState::Disconnected => "Disconnected",
            SessionState::Failed => "Failed to connect",
        }
    }

    /// State entered when the capability reports `event`
    pub fn after(event: PublisherEvent) -> Self {
        match event {
            PublisherEvent::Started => SessionState::Publishing,
            PublisherEvent::Stopped => SessionState::Stopped,
            PublisherEvent::Disconnected => SessionState::Disconnected,
            PublisherEvent::FailedToConnect => SessionState::Failed,
        }
    }

    /// Whether `event` is consistent with this state.
    ///
    /// `start_pending` is true while a start command awaits its outcome.
    pub fn expects(self, event: PublisherEvent, start_pending: bool) -> bool {
        match event {
            PublisherEvent::Started => self.is_initialized() && self != SessionState::Publishing,
            PublisherEvent::Stopped | PublisherEvent::Disconnected => {
                self == SessionState::Publishing
            }
            PublisherEvent::FailedToConnect => self == SessionState::Publishing || start_pending,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One state transition, as seen by observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub previous: SessionState,
    pub state: SessionState,
    /// Suggested user-facing message
    pub message: String,
    /// Set when the transition is into `Failed`
    pub failure: Option<CapabilityFailure>,
    pub at: DateTime<Utc>,
}

/// Everything a session tells its observers, in order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionNotification {
    StateChanged(StateChange),
    Elapsed(ElapsedTime),
}

/// Publish button state, derived from the capability's own view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub publishing: bool,
    pub toggle_label: &'static str,
}

impl Controls {
    pub fn for_active(publishing: bool) -> Self {
        Self {
            publishing,
            toggle_label: if publishing {
                "Stop publishing"
            } else {
                "Start publishing"
            },
        }
    }
}

/// Result of the capture-permission request made before initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePermission {
    Granted,
    Denied,
}
