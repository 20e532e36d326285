//! Upstream weather provider access.
//!
//! Defines the `CurrentConditions` trait that the HTTP layer depends on,
//! and the WeatherAPI.com implementation.

pub mod weatherapi;

use async_trait::async_trait;
use secrecy::SecretString;
use std::time::Duration;

use crate::types::{RelayError, UpstreamWeatherResponse};

pub use weatherapi::WeatherApiClient;

/// Fixed provider settings, established once at startup.
#[derive(Debug)]
pub struct ProviderSettings {
    /// Full URL of the current-conditions endpoint.
    pub base_url: String,
    pub api_key: SecretString,
    /// Bound on the whole upstream exchange.
    pub timeout: Duration,
}

/// A source of current weather conditions for a city.
///
/// Implementors perform exactly one attempt per call and classify every
/// failure into a `RelayError`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurrentConditions: Send + Sync {
    async fn current(&self, city: &str) -> Result<UpstreamWeatherResponse, RelayError>;
}
