//! Route handlers.
//!
//! `get_weather` is the lookup handler: validate, call upstream once,
//! map the outcome. State is shared via `Arc<RelayState>`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::types::{NormalizedWeatherReport, RelayError};
use crate::upstream::CurrentConditions;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Read-only state accessible by all route handlers.
pub struct RelayState {
    pub upstream: Arc<dyn CurrentConditions>,
}

impl RelayState {
    pub fn new(upstream: Arc<dyn CurrentConditions>) -> Self {
        Self { upstream }
    }
}

pub type AppState = Arc<RelayState>;

// ---------------------------------------------------------------------------
// Request / response mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub city: Option<String>,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Trimmed, non-empty city name or `MissingParameter`.
fn required_city(query: Option<&WeatherQuery>) -> Result<&str, RelayError> {
    query
        .and_then(|q| q.city.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(RelayError::MissingParameter)
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /weather?city=<name>
///
/// An unparseable query string is treated the same as a missing `city`.
pub async fn get_weather(
    State(state): State<AppState>,
    query: Option<Query<WeatherQuery>>,
) -> Result<Json<NormalizedWeatherReport>, RelayError> {
    let city = match required_city(query.as_deref()) {
        Ok(city) => city,
        Err(e) => {
            warn!("Weather request without a city");
            return Err(e);
        }
    };

    match state.upstream.current(city).await {
        Ok(upstream) => {
            let report = NormalizedWeatherReport::from_upstream(&upstream);
            info!(city, resolved = ?report.city, "Weather report served");
            Ok(Json(report))
        }
        Err(e) => {
            match &e {
                RelayError::UpstreamRejected { status, message } => {
                    warn!(city, status = status.as_u16(), %message, "WeatherAPI rejected lookup");
                }
                other => {
                    error!(city, error = %other, "Weather lookup failed");
                }
            }
            Err(e)
        }
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
