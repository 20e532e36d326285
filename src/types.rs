//! Core domain types for the weather relay.
//!
//! Two request-scoped shapes flow through the relay: the provider's raw
//! payload and the normalized report handed to the browser client. Both
//! are created per call and discarded once the response is written.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Upstream payload (WeatherAPI.com JSON → Rust)
// ---------------------------------------------------------------------------

/// Raw `current.json` payload. Every level is optional so that a missing
/// sub-field maps to `null` in the report instead of failing the request.
///
/// Leaves are kept as raw JSON values: passthrough fields are forwarded
/// exactly as received (`11` stays `11`, `82.0` stays `82.0`), and derived
/// fields treat a value of the wrong type as absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct UpstreamWeatherResponse {
    #[serde(default)]
    pub location: Option<UpstreamLocation>,
    #[serde(default)]
    pub current: Option<UpstreamCurrent>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct UpstreamLocation {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub country: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct UpstreamCurrent {
    #[serde(default)]
    pub temp_c: Option<Value>,
    #[serde(default)]
    pub feelslike_c: Option<Value>,
    /// Millibars, numerically identical to hectopascals.
    #[serde(default)]
    pub pressure_mb: Option<Value>,
    #[serde(default)]
    pub humidity: Option<Value>,
    #[serde(default)]
    pub wind_kph: Option<Value>,
    #[serde(default)]
    pub condition: Option<UpstreamCondition>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct UpstreamCondition {
    #[serde(default)]
    pub text: Option<Value>,
    /// Scheme-relative, e.g. `//cdn.weatherapi.com/weather/64x64/day/116.png`.
    #[serde(default)]
    pub icon: Option<Value>,
}

/// Inner object of the error envelope sent alongside a non-2xx status:
/// `{"error":{"message":"..."}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Outward-facing response shapes
// ---------------------------------------------------------------------------

/// The fixed JSON contract consumed by the front-end. Field names and
/// units must not change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedWeatherReport {
    pub city: Option<Value>,
    pub country: Option<Value>,
    pub temperature_c: Option<Value>,
    pub feels_like_c: Option<Value>,
    pub pressure: Option<Value>,
    pub humidity: Option<Value>,
    pub description: String,
    pub icon: String,
    pub wind_speed_m_s: f64,
}

/// Body of every failed response: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Message used when the upstream error body is JSON but carries no message.
pub const DEFAULT_REJECTION_MESSAGE: &str = "City not found or invalid API key.";

/// Every way a lookup can fail. Each variant is terminal for its request.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Missing 'city' parameter")]
    MissingParameter,

    #[error("{message}")]
    UpstreamRejected { status: StatusCode, message: String },

    #[error("Connection error, check network or API URL.")]
    UpstreamUnreachable,

    #[error("An unexpected error occurred: {0}")]
    Internal(String),
}

impl RelayError {
    /// Build the fallback rejection used when the upstream error body is
    /// not in the expected shape.
    pub fn generic_rejection(status: StatusCode) -> Self {
        RelayError::UpstreamRejected {
            status,
            message: format!(
                "HTTP Error: Could not reach weather service. {}",
                status.as_u16()
            ),
        }
    }

    /// HTTP status surfaced to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingParameter => StatusCode::BAD_REQUEST,
            RelayError::UpstreamRejected { status, .. } => *status,
            RelayError::UpstreamUnreachable | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
