//! Sheets MCP Server Library
//!
//! A Model Context Protocol (MCP) server for Google Sheets integration,
//! with a parallel HTTP/REST surface. Provides tools for reading, writing,
//! creating and sharing spreadsheets via the Sheets and Drive APIs.

pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod registry;
pub mod sheets;

pub use config::Config;
pub use error::{Result, SheetsMcpError};
