use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;

/// Opaque stream destination (e.g. `rtmp://host/app/key`)
///
/// Guaranteed non-blank once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StreamTarget(String);

impl StreamTarget {
    pub fn parse(target: &str) -> Result<Self, ConfigError> {
        let trimmed = target.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL scheme in lowercase, if the target has one
    pub fn scheme(&self) -> Option<String> {
        self.0
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which camera feeds the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Front,
    #[default]
    Back,
}

impl CaptureMode {
    pub fn switched(self) -> Self {
        match self {
            CaptureMode::Front => CaptureMode::Back,
            CaptureMode::Back => CaptureMode::Front,
        }
    }
}

/// Encoded frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: 720,
            height: 1280, // Portrait
        }
    }
}

/// Everything the publishing capability needs to be built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Where the stream is sent
    pub target: StreamTarget,
    /// Encoded frame size
    pub frame_size: FrameSize,
    /// Audio bitrate in bits per second
    pub audio_bitrate: u32,
    /// Video bitrate in bits per second
    pub video_bitrate: u32,
    /// Initial capture source
    pub capture_mode: CaptureMode,
}

impl PublisherConfig {
    pub const DEFAULT_AUDIO_BITRATE: u32 = 6_400;
    pub const DEFAULT_VIDEO_BITRATE: u32 = 100_000;

    /// Config with the default encoder settings bound to `target`
    pub fn new(target: StreamTarget) -> Self {
        Self {
            target,
            frame_size: FrameSize::default(),
            audio_bitrate: Self::DEFAULT_AUDIO_BITRATE,
            video_bitrate: Self::DEFAULT_VIDEO_BITRATE,
            capture_mode: CaptureMode::default(),
        }
    }
}
