//! Quartermaster Server library surface.
//!
//! The binary in `main.rs` wires configuration, the secret backend and the
//! HTTP router together; everything reusable (and testable) lives here.

pub mod api;
pub mod auth;
pub mod config;
pub mod problem;
