use futures::stream::{self, Stream};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

use super::elapsed::ElapsedTime;
use super::state::{SessionNotification, SessionState, StateChange};

/// Ordered feed of every notification a session emits after subscribing
pub struct SessionSubscription {
    rx: broadcast::Receiver<SessionNotification>,
}

impl SessionSubscription {
    pub(crate) fn new(rx: broadcast::Receiver<SessionNotification>) -> Self {
        Self { rx }
    }

    /// Next notification, or `None` once the session is gone
    pub async fn next(&mut self) -> Option<SessionNotification> {
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Session subscriber lagged, {} notifications skipped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next state transition, skipping elapsed-time samples
    pub async fn next_state_change(&mut self) -> Option<StateChange> {
        loop {
            if let SessionNotification::StateChanged(change) = self.next().await? {
                return Some(change);
            }
        }
    }

    /// Next notification if one is already queued
    pub fn try_next(&mut self) -> Option<SessionNotification> {
        loop {
            match self.rx.try_recv() {
                Ok(notification) => return Some(notification),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Session subscriber lagged, {} notifications skipped", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = SessionNotification> {
        stream::unfold(self, |mut sub| async move {
            sub.next().await.map(|notification| (notification, sub))
        })
    }
}

/// Elapsed-time samples for the current publishing period
///
/// Ends as soon as the session leaves `Publishing`. A consumer that falls
/// more than the channel capacity behind is ended as well, since it can no
/// longer tell which period a sample belongs to.
pub struct ElapsedTimeStream {
    rx: broadcast::Receiver<SessionNotification>,
    finished: bool,
}

impl ElapsedTimeStream {
    pub(crate) fn new(rx: broadcast::Receiver<SessionNotification>) -> Self {
        Self {
            rx,
            finished: false,
        }
    }

    pub async fn next(&mut self) -> Option<ElapsedTime> {
        while !self.finished {
            match self.rx.recv().await {
                Ok(SessionNotification::Elapsed(sample)) => return Some(sample),
                Ok(SessionNotification::StateChanged(change)) => {
                    if change.state != SessionState::Publishing {
                        self.finished = true;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Elapsed-time subscriber lagged by {}, ending stream", skipped);
                    self.finished = true;
                }
                Err(RecvError::Closed) => self.finished = true,
            }
        }
        None
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_stream(self) -> impl Stream<Item = ElapsedTime> {
        stream::unfold(self, |mut ticks| async move {
            ticks.next().await.map(|sample| (sample, ticks))
        })
    }
}
