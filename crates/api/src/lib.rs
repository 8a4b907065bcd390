//! Roster API server library.
//!
//! Exposes the building blocks (config, state, error handling, record
//! service, routes, metrics, server lifecycle) so integration tests and the
//! binary entrypoint can both access them.

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod process;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;
