//! HTTP surface for the completion relay
//!
//! Serves the single endpoint client front-ends call:
//! - POST /api/chat - prompt plus prior turns in, one reply out
//! - GET /health - liveness check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
