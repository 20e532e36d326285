//! Upstream → report field mapping.
//!
//! Every output field is a passthrough or a pure function of exactly one
//! upstream field. Nothing here can fail.

use serde_json::Value;

use crate::types::{NormalizedWeatherReport, UpstreamWeatherResponse};

/// 1 km/h = 1000 m / 3600 s.
const KPH_PER_M_S: f64 = 3.6;

/// Scheme prepended to the provider's scheme-relative icon paths.
const ICON_SCHEME: &str = "https:";

impl NormalizedWeatherReport {
    /// Map a provider payload onto the fixed report shape.
    pub fn from_upstream(upstream: &UpstreamWeatherResponse) -> Self {
        let location = upstream.location.as_ref();
        let current = upstream.current.as_ref();
        let condition = current.and_then(|c| c.condition.as_ref());

        Self {
            city: location.and_then(|l| l.name.clone()),
            country: location.and_then(|l| l.country.clone()),
            temperature_c: current.and_then(|c| c.temp_c.clone()),
            feels_like_c: current.and_then(|c| c.feelslike_c.clone()),
            pressure: current.and_then(|c| c.pressure_mb.clone()),
            humidity: current.and_then(|c| c.humidity.clone()),
            description: title_case(
                condition
                    .and_then(|c| c.text.as_ref())
                    .and_then(Value::as_str)
                    .unwrap_or(""),
            ),
            icon: secure_icon_url(
                condition
                    .and_then(|c| c.icon.as_ref())
                    .and_then(Value::as_str),
            ),
            wind_speed_m_s: kph_to_m_s(
                current
                    .and_then(|c| c.wind_kph.as_ref())
                    .and_then(Value::as_f64),
            ),
        }
    }
}

/// Upper-case the first character of each whitespace-separated word and
/// lower-case the rest. Whitespace is kept as-is.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    out
}

/// Absent, zero, or non-finite speeds yield 0 rather than NaN.
pub fn kph_to_m_s(wind_kph: Option<f64>) -> f64 {
    match wind_kph {
        Some(kph) if kph != 0.0 && kph.is_finite() => kph / KPH_PER_M_S,
        _ => 0.0,
    }
}

/// `//cdn/icon.png` → `https://cdn/icon.png`; absent → `https:`.
pub fn secure_icon_url(icon: Option<&str>) -> String {
    format!("{ICON_SCHEME}{}", icon.unwrap_or(""))
}
