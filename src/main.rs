//! Weather relay entry point.
//!
//! Loads configuration, initialises structured logging, resolves the
//! WeatherAPI key, and serves `GET /weather` until Ctrl+C.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use weather_relay::config::AppConfig;
use weather_relay::server::{self, RelayState};
use weather_relay::upstream::WeatherApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load_default()?;

    init_logging();

    let settings = cfg.provider_settings()?;
    let addr = cfg.socket_addr()?;
    info!(
        base_url = %settings.base_url,
        timeout_secs = settings.timeout.as_secs(),
        api_key_env = %cfg.provider.api_key_env,
        "Weather relay starting up"
    );

    let client = WeatherApiClient::new(settings)?;
    let state = Arc::new(RelayState::new(Arc::new(client)));

    server::serve(state, addr).await
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("weather_relay=info"));

    let json_logging = std::env::var("WEATHER_RELAY_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
