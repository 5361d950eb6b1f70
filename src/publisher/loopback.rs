// In-process publishing capability that simulates an RTMP connection

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{info, warn};

use super::backend::{Publisher, PublisherEvent, PublisherFactory, PublisherListener};
use super::config::{CaptureMode, PublisherConfig};

/// Loopback publisher
///
/// Accepts `rtmp://` and `rtmps://` targets, reporting `Started` after the
/// connect delay; any other scheme is reported as `FailedToConnect`.
/// Nothing leaves the process.
#[derive(Clone)]
pub struct LoopbackPublisher {
    inner: Arc<LoopbackState>,
}

struct LoopbackState {
    config: PublisherConfig,
    listener: PublisherListener,
    runtime: Handle,
    connect_delay: Duration,
    active: AtomicBool,
    /// A connect attempt is in flight
    connecting: AtomicBool,
    capture_mode: Mutex<CaptureMode>,
}

impl LoopbackPublisher {
    pub fn new(
        config: PublisherConfig,
        listener: PublisherListener,
        connect_delay: Duration,
    ) -> Result<Self> {
        let runtime =
            Handle::try_current().context("Loopback publisher requires a tokio runtime")?;

        info!(
            "Loopback publisher initialized ({} {}x{}, audio {}bps, video {}bps)",
            config.target,
            config.frame_size.width,
            config.frame_size.height,
            config.audio_bitrate,
            config.video_bitrate
        );

        let capture_mode = Mutex::new(config.capture_mode);
        Ok(Self {
            inner: Arc::new(LoopbackState {
                config,
                listener,
                runtime,
                connect_delay,
                active: AtomicBool::new(false),
                connecting: AtomicBool::new(false),
                capture_mode,
            }),
        })
    }

    /// Current capture source
    pub fn capture_mode(&self) -> CaptureMode {
        *self
            .inner
            .capture_mode
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate the link dropping while live
    pub fn disconnect(&self) {
        if self.inner.active.swap(false, Ordering::SeqCst) {
            warn!("Loopback link to {} dropped", self.inner.config.target);
            self.inner.listener.notify(PublisherEvent::Disconnected);
        }
    }

    fn accepts_target(&self) -> bool {
        matches!(
            self.inner.config.target.scheme().as_deref(),
            Some("rtmp") | Some("rtmps")
        )
    }
}

impl Publisher for LoopbackPublisher {
    fn start(&self) {
        if self.inner.active.load(Ordering::SeqCst) {
            warn!("Loopback publisher already live");
            return;
        }
        if self.inner.connecting.swap(true, Ordering::SeqCst) {
            warn!("Loopback publisher already connecting");
            return;
        }

        info!("Connecting to {}", self.inner.config.target);

        let state = Arc::clone(&self.inner);
        let accepted = self.accepts_target();
        self.inner.runtime.spawn(async move {
            if !state.connect_delay.is_zero() {
                tokio::time::sleep(state.connect_delay).await;
            }

            if accepted {
                state.active.store(true, Ordering::SeqCst);
                state.connecting.store(false, Ordering::SeqCst);
                state.listener.notify(PublisherEvent::Started);
            } else {
                state.connecting.store(false, Ordering::SeqCst);
                warn!("Unsupported stream target: {}", state.config.target);
                state.listener.notify(PublisherEvent::FailedToConnect);
            }
        });
    }

    fn stop(&self) {
        if self.inner.active.swap(false, Ordering::SeqCst) {
            info!("Closing stream to {}", self.inner.config.target);
            self.inner.listener.notify(PublisherEvent::Stopped);
        }
    }

    fn switch_capture_source(&self) {
        let mut mode = self
            .inner
            .capture_mode
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *mode = mode.switched();
        info!("Capture source switched to {:?}", *mode);
    }

    fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "loopback"
    }
}

/// Factory for loopback publishers
///
/// Keeps the most recently built publisher so callers can drive it
/// (e.g. simulate a disconnect).
#[derive(Default)]
pub struct LoopbackFactory {
    connect_delay: Duration,
    latest: Mutex<Option<LoopbackPublisher>>,
}

impl LoopbackFactory {
    pub fn new(connect_delay: Duration) -> Self {
        Self {
            connect_delay,
            latest: Mutex::new(None),
        }
    }

    pub fn latest(&self) -> Option<LoopbackPublisher> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PublisherFactory for LoopbackFactory {
    fn build(
        &self,
        config: PublisherConfig,
        listener: PublisherListener,
    ) -> Result<Box<dyn Publisher>> {
        let publisher = LoopbackPublisher::new(config, listener, self.connect_delay)?;
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(publisher.clone());
        Ok(Box::new(publisher))
    }
}
