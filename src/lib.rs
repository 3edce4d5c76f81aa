//! Library crate for piggy-bank-back, exposing modules for binaries and integration tests.

/// File and environment configuration.
pub mod config;
/// Client for the piggy bank REST API.
pub mod device;
/// Request, response and event payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP route trees.
pub mod routes;
/// Polling, aggregation, commands and event broadcasting.
pub mod services;
/// Shared application state.
pub mod state;
