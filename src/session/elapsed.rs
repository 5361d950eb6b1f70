//! Elapsed-time tracking for a live session
//!
//! One tracker covers one publishing period. It is started when the session
//! goes live, cancelled when it leaves that state, and never resumed.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Receives each elapsed-time sample
pub type TickSink = Arc<dyn Fn(ElapsedTime) + Send + Sync>;

/// Whole minutes and seconds since the tracker started
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ElapsedTime {
    minutes: u64,
    seconds: u64,
}

impl ElapsedTime {
    pub const ZERO: ElapsedTime = ElapsedTime {
        minutes: 0,
        seconds: 0,
    };

    pub fn from_duration(elapsed: Duration) -> Self {
        let total = elapsed.as_secs();
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }

    /// Minutes as a zero-padded two-digit string (grows past two digits after 99)
    pub fn minutes(&self) -> String {
        format!("{:02}", self.minutes)
    }

    /// Seconds as a zero-padded two-digit string
    pub fn seconds(&self) -> String {
        format!("{:02}", self.seconds)
    }

    pub fn total_seconds(&self) -> u64 {
        self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Handle to a running elapsed-time ticker
///
/// Dropping the handle cancels the ticker.
pub struct ElapsedTimeTracker {
    started_at: Instant,
    token: CancellationToken,
    // Held while a sample is handed to the sink, and while cancelling.
    // Guards the instant of the last delivered sample.
    emit_gate: Arc<Mutex<Option<Instant>>>,
}

impl ElapsedTimeTracker {
    /// Start ticking every `interval`, beginning with an immediate `00:00`.
    /// Must be called within a tokio runtime.
    pub fn start(interval: Duration, sink: TickSink) -> Self {
        Self::start_on(&Handle::current(), interval, sink)
    }

    /// Like `start`, but the ticker runs on `runtime`, so the caller may be
    /// on any thread.
    pub fn start_on(runtime: &Handle, interval: Duration, sink: TickSink) -> Self {
        let started_at = Instant::now();
        let token = CancellationToken::new();
        let emit_gate = Arc::new(Mutex::new(None));

        let task_token = token.clone();
        let task_gate = Arc::clone(&emit_gate);

        runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(started_at, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last = ElapsedTime::ZERO;

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        // Never go backwards, even if the clock is coarse
                        let sample = ElapsedTime::from_duration(started_at.elapsed()).max(last);
                        last = sample;

                        let mut last_tick_at = task_gate.lock().unwrap_or_else(PoisonError::into_inner);
                        if task_token.is_cancelled() {
                            break;
                        }
                        debug!("Elapsed {}", sample);
                        *last_tick_at = Some(Instant::now());
                        sink(sample);
                    }
                }
            }

            debug!("Elapsed-time ticker stopped");
        });

        Self {
            started_at,
            token,
            emit_gate,
        }
    }

    /// Stop ticking. No sample reaches the sink once this returns.
    pub fn cancel(&self) {
        let _gate = self
            .emit_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.token.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// When the most recent sample was delivered; `None` before the first
    pub fn last_tick_at(&self) -> Option<Instant> {
        *self
            .emit_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Time since start, regardless of tick cadence
    pub fn elapsed(&self) -> ElapsedTime {
        ElapsedTime::from_duration(self.started_at.elapsed())
    }
}

impl Drop for ElapsedTimeTracker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_time_formatting() {
        let t = ElapsedTime::from_duration(Duration::from_millis(65_900));
        assert_eq!(t.minutes(), "01");
        assert_eq!(t.seconds(), "05");
        assert_eq!(t.to_string(), "01:05");
    }

    #[test]
    fn test_elapsed_time_zero() {
        let t = ElapsedTime::from_duration(Duration::from_millis(999));
        assert_eq!(t, ElapsedTime::ZERO);
        assert_eq!(t.to_string(), "00:00");
    }

    #[test]
    fn test_elapsed_time_past_an_hour() {
        let t = ElapsedTime::from_duration(Duration::from_secs(3_661));
        assert_eq!(t.minutes(), "61");
        assert_eq!(t.seconds(), "01");
        assert_eq!(t.total_seconds(), 3_661);
    }

    #[test]
    fn test_elapsed_time_ordering() {
        let a = ElapsedTime::from_duration(Duration::from_secs(59));
        let b = ElapsedTime::from_duration(Duration::from_secs(60));
        assert!(a < b);
    }
}
