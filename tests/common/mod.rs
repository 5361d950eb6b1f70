// Shared test fixtures: a scripted publishing capability that records the
// commands it receives and lets a test report lifecycle events by hand.

#![allow(dead_code)]

use anyhow::{bail, Result};
use live_publisher::{
    ControllerSettings, Publisher, PublisherConfig, PublisherEvent, PublisherFactory,
    PublisherListener, SessionController, SessionNotification, SessionState, SessionSubscription,
    StateChange,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    SwitchSource,
}

#[derive(Default)]
struct Script {
    builds: Vec<PublisherConfig>,
    commands: Vec<Command>,
    listener: Option<PublisherListener>,
    active: bool,
    fail_build: bool,
}

#[derive(Clone, Default)]
pub struct ScriptedFactory {
    script: Arc<Mutex<Script>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let factory = Self::default();
        factory.script.lock().unwrap().fail_build = true;
        factory
    }

    pub fn builds(&self) -> Vec<PublisherConfig> {
        self.script.lock().unwrap().builds.clone()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.script.lock().unwrap().commands.clone()
    }

    pub fn set_active(&self, active: bool) {
        self.script.lock().unwrap().active = active;
    }

    /// Report an event through the listener, as a real capability would
    pub fn emit(&self, event: PublisherEvent) {
        let listener = self
            .script
            .lock()
            .unwrap()
            .listener
            .clone()
            .expect("publisher was never built");
        assert!(listener.notify(event), "session is gone");
    }
}

struct ScriptedPublisher {
    script: Arc<Mutex<Script>>,
}

impl ScriptedPublisher {
    fn record(&self, command: Command) {
        self.script.lock().unwrap().commands.push(command);
    }
}

impl Publisher for ScriptedPublisher {
    fn start(&self) {
        self.record(Command::Start);
    }

    fn stop(&self) {
        self.record(Command::Stop);
    }

    fn switch_capture_source(&self) {
        self.record(Command::SwitchSource);
    }

    fn is_active(&self) -> bool {
        self.script.lock().unwrap().active
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

impl PublisherFactory for ScriptedFactory {
    fn build(
        &self,
        config: PublisherConfig,
        listener: PublisherListener,
    ) -> Result<Box<dyn Publisher>> {
        let mut script = self.script.lock().unwrap();
        if script.fail_build {
            bail!("encoder unavailable");
        }
        script.builds.push(config);
        script.listener = Some(listener);
        Ok(Box::new(ScriptedPublisher {
            script: Arc::clone(&self.script),
        }))
    }
}

pub fn controller(factory: &ScriptedFactory) -> SessionController {
    controller_with(factory, ControllerSettings::default())
}

pub fn controller_with(factory: &ScriptedFactory, settings: ControllerSettings) -> SessionController {
    SessionController::new(Arc::new(factory.clone()), settings)
}

/// Wait (bounded) for the next transition into `state`
pub async fn wait_for_state(sub: &mut SessionSubscription, state: SessionState) -> StateChange {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let change = sub
                .next_state_change()
                .await
                .expect("session closed before reaching state");
            if change.state == state {
                return change;
            }
        }
    })
    .await
    .expect("timed out waiting for state")
}

/// Drain everything already queued on the subscription
pub fn drain(sub: &mut SessionSubscription) -> Vec<SessionNotification> {
    std::iter::from_fn(|| sub.try_next()).collect()
}
