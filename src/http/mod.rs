//! HTTP transport module
//!
//! REST façade over the tool registry: per-tool endpoints, API-key auth,
//! health check and self-served documentation.

pub mod keys;
pub mod server;
