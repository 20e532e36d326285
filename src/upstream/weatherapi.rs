//! WeatherAPI.com current-conditions client.
//!
//! API: `GET http://api.weatherapi.com/v1/current.json?key=..&q=..&aqi=no`
//! Auth: API key as the `key` query parameter.
//! Errors: non-2xx status with `{"error":{"code":..,"message":".."}}`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{CurrentConditions, ProviderSettings};
use crate::types::{
    RelayError, UpstreamErrorDetail, UpstreamWeatherResponse, DEFAULT_REJECTION_MESSAGE,
};

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// WeatherAPI.com client. Holds no per-request state; safe to share
/// across concurrent requests.
pub struct WeatherApiClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl WeatherApiClient {
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("weather-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build WeatherAPI HTTP client")?;

        Ok(Self {
            http,
            base_url: settings.base_url,
            api_key: settings.api_key,
        })
    }
}

#[async_trait]
impl CurrentConditions for WeatherApiClient {
    async fn current(&self, city: &str) -> Result<UpstreamWeatherResponse, RelayError> {
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.expose_secret().as_str()),
                ("q", city),
                ("aqi", "no"),
            ])
            .send()
            .await
            .map_err(classify_transport)?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(classify_transport)?;
        debug!(city, status = status.as_u16(), bytes = body.len(), "WeatherAPI responded");

        if !status.is_success() {
            return Err(classify_rejection(status, &body));
        }

        decode_success(&body)
    }
}

// ---------------------------------------------------------------------------
// Outcome classification
// ---------------------------------------------------------------------------

/// Connect failures (including DNS) and timeouts mean the provider was
/// never reached; anything else is unexpected.
fn classify_transport(err: reqwest::Error) -> RelayError {
    if err.is_connect() || err.is_timeout() {
        warn!(error = %err, "WeatherAPI unreachable");
        RelayError::UpstreamUnreachable
    } else {
        RelayError::Internal(err.without_url().to_string())
    }
}

/// Map a non-2xx response to a rejection carrying the provider's status.
///
/// A JSON object body yields `error.message`, or a default message when
/// the `error` key or its `message` is absent. A non-object `error`
/// (including `null`) or a body that is not a JSON object yields a generic
/// message with the status.
pub(crate) fn classify_rejection(status: StatusCode, body: &[u8]) -> RelayError {
    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return RelayError::generic_rejection(status),
    };

    let Some(fields) = value.as_object() else {
        return RelayError::generic_rejection(status);
    };

    let message = match fields.get("error") {
        None => None,
        Some(detail @ Value::Object(_)) => match UpstreamErrorDetail::deserialize(detail) {
            Ok(detail) => detail.message,
            Err(_) => return RelayError::generic_rejection(status),
        },
        Some(_) => return RelayError::generic_rejection(status),
    };

    RelayError::UpstreamRejected {
        status,
        message: message.unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string()),
    }
}

pub(crate) fn decode_success(body: &[u8]) -> Result<UpstreamWeatherResponse, RelayError> {
    serde_json::from_slice(body).map_err(|e| RelayError::Internal(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
