//! HTTP query surface
//!
//! Exposes readiness, liveness, breaker state, metrics and recent transitions.

pub mod routes;
pub mod server;
pub mod state;


pub use server::HttpServer;
pub use state::AppState;
