use crate::session::SessionController;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The session this server controls
    pub session: SessionController,

    /// Target used when an initialize request names none
    pub default_target: Option<String>,
}

impl AppState {
    pub fn new(session: SessionController, default_target: Option<String>) -> Self {
        Self {
            session,
            default_target: default_target.filter(|t| !t.trim().is_empty()),
        }
    }
}
