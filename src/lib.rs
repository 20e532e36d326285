//! Weather relay: normalizes WeatherAPI.com current conditions
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod report;
pub mod upstream;
pub mod server;
