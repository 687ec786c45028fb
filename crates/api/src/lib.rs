//! Library half of the PostPilot API server.
//!
//! Everything the binary wires together lives here (config, state, error
//! handling, routes, the job engine, background tasks) so integration
//! tests can build the same app without spawning a process.

pub mod auth;
pub mod background;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
