use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::ControllerSettings;
use super::elapsed::{ElapsedTime, ElapsedTimeTracker, TickSink};
use super::state::{CapturePermission, Controls, SessionNotification, SessionState, StateChange};
use super::subscription::{ElapsedTimeStream, SessionSubscription};
use crate::error::{CapabilityFailure, ConfigError, InvalidStateError, SessionError};
use crate::publisher::{Publisher, PublisherEvent, PublisherFactory, PublisherListener, StreamTarget};

/// Owner of a live publishing session
///
/// Every state transition, and every start or stop of the elapsed-time
/// tracker, happens under one lock. Commands are forwarded to the publishing
/// capability; state only changes when the capability reports back.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

struct Shared {
    id: Uuid,
    runtime: Handle,
    factory: Arc<dyn PublisherFactory>,
    settings: ControllerSettings,
    listener: PublisherListener,
    notifications: broadcast::Sender<SessionNotification>,
    core: Mutex<SessionCore>,
}

struct SessionCore {
    state: SessionState,
    target: Option<StreamTarget>,
    publisher: Option<Box<dyn Publisher>>,
    /// Present exactly while `state` is `Publishing`
    tracker: Option<ElapsedTimeTracker>,
    start_pending: bool,
}

impl SessionController {
    /// Create an uninitialized session. Must be called within a tokio runtime;
    /// the session's background work stays on that runtime afterwards.
    pub fn new(factory: Arc<dyn PublisherFactory>, settings: ControllerSettings) -> Self {
        let (listener, events) = PublisherListener::channel();
        let (notifications, _) = broadcast::channel(settings.notification_capacity.max(1));

        let runtime = Handle::current();
        let shared = Arc::new(Shared {
            id: Uuid::new_v4(),
            runtime: runtime.clone(),
            factory,
            settings,
            listener,
            notifications,
            core: Mutex::new(SessionCore {
                state: SessionState::Uninitialized,
                target: None,
                publisher: None,
                tracker: None,
                start_pending: false,
            }),
        });

        runtime.spawn(pump_events(Arc::downgrade(&shared), events));

        info!("Created publishing session {}", shared.id);

        Self { shared }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// Bind the session to `target` and build the publishing capability.
    ///
    /// Once initialized, further calls return the current state and build nothing.
    pub fn initialize(&self, target: &str) -> Result<SessionState, ConfigError> {
        let mut core = self.shared.lock_core();
        if core.publisher.is_some() {
            debug!("Session {} already initialized ({})", self.shared.id, core.state);
            return Ok(core.state);
        }

        let target = StreamTarget::parse(target).inspect_err(|_| {
            warn!("Session {}: stream target is empty", self.shared.id);
        })?;

        let config = self.shared.settings.publisher_config(target.clone());
        let publisher = self
            .shared
            .factory
            .build(config, self.shared.listener.clone())
            .map_err(|e| {
                error!("Failed to build publisher for {}: {:#}", target, e);
                ConfigError::Capability(format!("{:#}", e))
            })?;

        info!(
            "Session {} bound to {} via {} publisher",
            self.shared.id,
            target,
            publisher.name()
        );

        core.target = Some(target);
        core.publisher = Some(publisher);
        self.shared.transition(&mut core, SessionState::Ready, None);

        Ok(core.state)
    }

    /// Initialize only if capture permission was granted
    pub fn initialize_with_permission(
        &self,
        permission: CapturePermission,
        target: &str,
    ) -> Result<SessionState, SessionError> {
        match permission {
            CapturePermission::Granted => Ok(self.initialize(target)?),
            CapturePermission::Denied => {
                warn!("Session {}: capture permission denied", self.shared.id);
                Err(SessionError::PermissionDenied)
            }
        }
    }

    /// Start publishing if not live, stop if live.
    ///
    /// Only issues the command; the state follows the capability's event.
    pub fn toggle_publish(&self) -> Result<(), InvalidStateError> {
        let mut core = self.shared.lock_core();
        let state = core.state;
        let publisher = core
            .publisher
            .as_ref()
            .ok_or(InvalidStateError::NotInitialized)?;

        if state == SessionState::Publishing {
            info!("Session {}: stop requested", self.shared.id);
            publisher.stop();
        } else {
            info!("Session {}: start requested ({})", self.shared.id, state);
            publisher.start();
            core.start_pending = true;
        }

        Ok(())
    }

    /// Flip the capture source, live or not
    pub fn switch_capture_source(&self) -> Result<(), InvalidStateError> {
        let core = self.shared.lock_core();
        let publisher = core
            .publisher
            .as_ref()
            .ok_or(InvalidStateError::NotInitialized)?;

        info!("Session {}: switching capture source", self.shared.id);
        publisher.switch_capture_source();

        Ok(())
    }

    /// Apply a lifecycle event from the capability.
    ///
    /// Events that do not fit the current state are logged and applied anyway.
    /// Two cases change nothing: any event before a capability exists, and
    /// `Started` while already publishing. Safe to call from any thread.
    pub fn handle_event(&self, event: PublisherEvent) -> SessionState {
        self.shared.handle_event(event)
    }

    pub fn current_state(&self) -> SessionState {
        self.shared.lock_core().state
    }

    pub fn stream_target(&self) -> Option<StreamTarget> {
        self.shared.lock_core().target.clone()
    }

    /// Publish button state according to the capability; `None` before initialization
    pub fn controls(&self) -> Option<Controls> {
        let core = self.shared.lock_core();
        core.publisher
            .as_ref()
            .map(|publisher| Controls::for_active(publisher.is_active()))
    }

    /// Whether an elapsed-time tracker is running
    pub fn is_tracking(&self) -> bool {
        self.shared
            .lock_core()
            .tracker
            .as_ref()
            .is_some_and(ElapsedTimeTracker::is_running)
    }

    /// Time spent in the current publishing period
    pub fn elapsed(&self) -> Option<ElapsedTime> {
        self.shared
            .lock_core()
            .tracker
            .as_ref()
            .map(ElapsedTimeTracker::elapsed)
    }

    /// All notifications from now on, in emission order
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription::new(self.shared.notifications.subscribe())
    }

    /// Elapsed-time samples for the current publishing period; `None` when not live
    pub fn elapsed_updates(&self) -> Option<ElapsedTimeStream> {
        let core = self.shared.lock_core();
        (core.state == SessionState::Publishing)
            .then(|| ElapsedTimeStream::new(self.shared.notifications.subscribe()))
    }
}

impl Shared {
    fn lock_core(&self) -> MutexGuard<'_, SessionCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle_event(&self, event: PublisherEvent) -> SessionState {
        let mut core = self.lock_core();
        let previous = core.state;

        if core.publisher.is_none() {
            warn!(
                "Session {}: ignoring {:?}, no publisher has been built",
                self.id, event
            );
            return previous;
        }

        if previous == SessionState::Publishing && event == PublisherEvent::Started {
            warn!("Session {}: duplicate Started while publishing", self.id);
            core.start_pending = false;
            return previous;
        }

        if !previous.expects(event, core.start_pending) {
            warn!(
                "Session {}: unexpected {:?} while {}, applying anyway",
                self.id, event, previous
            );
        }
        core.start_pending = false;

        let next = SessionState::after(event);
        let failure = match event {
            PublisherEvent::FailedToConnect => Some(CapabilityFailure {
                target: core
                    .target
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            }),
            _ => None,
        };

        self.transition(&mut core, next, failure);
        core.state
    }

    /// Move to `next`, keeping the tracker in step and notifying observers.
    ///
    /// Leaving `Publishing` cancels the tracker before the notification is
    /// sent, so no sample from that period follows it.
    fn transition(
        &self,
        core: &mut SessionCore,
        next: SessionState,
        failure: Option<CapabilityFailure>,
    ) {
        let previous = core.state;

        if next != SessionState::Publishing {
            if let Some(tracker) = core.tracker.take() {
                tracker.cancel();
                debug!("Session {}: elapsed-time tracker stopped", self.id);
            }
        }

        core.state = next;
        info!("Session {}: {} -> {}", self.id, previous, next);

        let change = StateChange {
            previous,
            state: next,
            message: next.message().to_string(),
            failure,
            at: Utc::now(),
        };
        if self
            .notifications
            .send(SessionNotification::StateChanged(change))
            .is_err()
        {
            debug!("Session {}: no observers for {}", self.id, next);
        }

        if next == SessionState::Publishing && core.tracker.is_none() {
            core.tracker = Some(ElapsedTimeTracker::start_on(
                &self.runtime,
                self.settings.tick_interval,
                self.tick_sink(),
            ));
            debug!("Session {}: elapsed-time tracker started", self.id);
        }
    }

    fn tick_sink(&self) -> TickSink {
        let notifications = self.notifications.clone();
        Arc::new(move |sample: ElapsedTime| {
            // No receivers is fine; samples are not buffered for late subscribers
            let _ = notifications.send(SessionNotification::Elapsed(sample));
        })
    }
}

/// Feed capability events into the session until it is dropped
async fn pump_events(session: Weak<Shared>, mut events: mpsc::UnboundedReceiver<PublisherEvent>) {
    while let Some(event) = events.recv().await {
        let Some(shared) = session.upgrade() else {
            break;
        };
        debug!("Session {}: received {:?}", shared.id, event);
        shared.handle_event(event);
    }

    debug!("Publisher event pump stopped");
}
