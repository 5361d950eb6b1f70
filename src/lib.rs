pub mod config;
pub mod error;
pub mod http;
pub mod publisher;
pub mod session;

pub use config::Config;
pub use error::{CapabilityFailure, ConfigError, InvalidStateError, SessionError};
pub use http::{create_router, AppState};
pub use publisher::{
    CaptureMode, FrameSize, LoopbackFactory, LoopbackPublisher, Publisher, PublisherConfig,
    PublisherEvent, PublisherFactory, PublisherListener, StreamTarget,
};
pub use session::{
    CapturePermission, Controls, ControllerSettings, ElapsedTime, ElapsedTimeStream,
    ElapsedTimeTracker, SessionController, SessionNotification, SessionState, SessionSubscription,
    StateChange,
};
