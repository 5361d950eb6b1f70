use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::publisher::{CaptureMode, FrameSize, PublisherConfig, StreamTarget};

/// Tuning for a session controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSettings {
    /// Cadence of elapsed-time samples while live
    /// Default: 1 second
    pub tick_interval: Duration,

    /// Buffered notifications per subscriber before it starts lagging
    pub notification_capacity: usize,

    /// Encoder frame size handed to the capability
    pub frame_size: FrameSize,

    /// Audio bitrate in bits per second
    pub audio_bitrate: u32,

    /// Video bitrate in bits per second
    pub video_bitrate: u32,

    /// Capture source used when the capability is built
    pub capture_mode: CaptureMode,
}

impl ControllerSettings {
    /// Capability config for `target` using these encoder settings
    pub fn publisher_config(&self, target: StreamTarget) -> PublisherConfig {
        PublisherConfig {
            target,
            frame_size: self.frame_size,
            audio_bitrate: self.audio_bitrate,
            video_bitrate: self.video_bitrate,
            capture_mode: self.capture_mode,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            notification_capacity: 64,
            frame_size: FrameSize::default(),
            audio_bitrate: PublisherConfig::DEFAULT_AUDIO_BITRATE,
            video_bitrate: PublisherConfig::DEFAULT_VIDEO_BITRATE,
            capture_mode: CaptureMode::default(),
        }
    }
}
