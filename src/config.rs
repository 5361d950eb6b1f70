use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::publisher::{CaptureMode, FrameSize, PublisherConfig};
use crate::session::ControllerSettings;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub publisher: PublisherSection,
    pub session: SessionSection,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PublisherSection {
    /// Default stream destination; may be left empty and supplied at runtime
    pub target: String,
    pub width: u32,
    pub height: u32,
    pub audio_bitrate: u32,
    pub video_bitrate: u32,
    pub capture_mode: CaptureMode,
    /// Simulated connect latency for the loopback publisher
    pub connect_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub tick_interval_ms: u64,
    pub notification_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "live-publisher".to_string(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8750,
        }
    }
}

impl Default for PublisherSection {
    fn default() -> Self {
        let frame = FrameSize::default();
        Self {
            target: String::new(),
            width: frame.width,
            height: frame.height,
            audio_bitrate: PublisherConfig::DEFAULT_AUDIO_BITRATE,
            video_bitrate: PublisherConfig::DEFAULT_VIDEO_BITRATE,
            capture_mode: CaptureMode::default(),
            connect_delay_ms: 250,
        }
    }
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            notification_capacity: 64,
        }
    }
}

impl Config {
    /// Load from `path` (any extension the `config` crate understands),
    /// then apply `LIVE_PUBLISHER__SECTION__KEY` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("LIVE_PUBLISHER").separator("__"))
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid live-publisher configuration")
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            tick_interval: Duration::from_millis(self.session.tick_interval_ms.max(1)),
            notification_capacity: self.session.notification_capacity,
            frame_size: FrameSize {
                width: self.publisher.width,
                height: self.publisher.height,
            },
            audio_bitrate: self.publisher.audio_bitrate,
            video_bitrate: self.publisher.video_bitrate,
            capture_mode: self.publisher.capture_mode,
        }
    }

    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.publisher.connect_delay_ms)
    }
}
