//! Publishing session management
//!
//! This module provides the `SessionController` that manages:
//! - Binding a session to a stream target and building the publishing capability
//! - Start/stop/switch-source commands
//! - State transitions driven by capability events
//! - Elapsed-time tracking while live
//! - Ordered notifications for observers

mod config;
mod controller;
mod elapsed;
mod state;
mod subscription;

pub use config::ControllerSettings;
pub use controller::SessionController;
pub use elapsed::{ElapsedTime, ElapsedTimeTracker, TickSink};
pub use state::{CapturePermission, Controls, SessionNotification, SessionState, StateChange};
pub use subscription::{ElapsedTimeStream, SessionSubscription};
