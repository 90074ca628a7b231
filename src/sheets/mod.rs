//! Google Sheets/Drive API module
//!
//! Contains types, service-account authentication, and the client facade for
//! interacting with the Sheets and Drive APIs.

pub mod auth;
pub mod client;
pub mod drive;
pub mod types;
