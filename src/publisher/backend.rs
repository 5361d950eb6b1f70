use anyhow::Result;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use super::config::PublisherConfig;

/// Lifecycle event reported by the publishing capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherEvent {
    /// The stream is live
    Started,
    /// The stream was stopped on request
    Stopped,
    /// The connection dropped while live
    Disconnected,
    /// The connection could not be established
    FailedToConnect,
}

/// Where a capability delivers its lifecycle events
///
/// Cheap to clone; events are queued and applied by the session controller
/// in arrival order.
#[derive(Debug, Clone)]
pub struct PublisherListener {
    tx: mpsc::UnboundedSender<PublisherEvent>,
}

impl PublisherListener {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PublisherEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Report an event. Returns false once the session is gone.
    pub fn notify(&self, event: PublisherEvent) -> bool {
        if self.tx.send(event).is_err() {
            debug!("Dropping {:?}: session controller is gone", event);
            return false;
        }
        true
    }
}

/// Live publishing capability trait
///
/// Implementations own capture, encoding and transport. Commands are
/// fire-and-forget: their outcome arrives later as a `PublisherEvent`.
pub trait Publisher: Send + Sync {
    /// Begin publishing
    fn start(&self);

    /// Stop publishing
    fn stop(&self);

    /// Flip between front and back capture sources
    fn switch_capture_source(&self);

    /// Whether the capability currently considers itself live
    fn is_active(&self) -> bool;

    /// Get publisher name for logging
    fn name(&self) -> &str;
}

/// Builds a publishing capability bound to one stream target
pub trait PublisherFactory: Send + Sync {
    fn build(
        &self,
        config: PublisherConfig,
        listener: PublisherListener,
    ) -> Result<Box<dyn Publisher>>;
}
