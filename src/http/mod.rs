//! HTTP API server for external control
//!
//! This module provides a REST API for driving the publishing session:
//! - POST /session/initialize - Bind the session to a stream target
//! - POST /session/toggle - Start or stop publishing
//! - POST /session/switch-source - Flip the capture source
//! - GET /session/status - Query state, target and elapsed time
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
