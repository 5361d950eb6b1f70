pub mod backend;
pub mod config;
pub mod loopback;

pub use backend::{Publisher, PublisherEvent, PublisherFactory, PublisherListener};
pub use config::{CaptureMode, FrameSize, PublisherConfig, StreamTarget};
pub use loopback::{LoopbackFactory, LoopbackPublisher};
