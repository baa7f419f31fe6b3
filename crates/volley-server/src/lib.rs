//! volley-server
//!
//! HTTP adapter over `volley-core`: submission and status endpoints,
//! env-driven configuration and the middleware stack.

pub mod config;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
