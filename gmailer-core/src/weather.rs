use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::LookupError,
    model::{Coordinates, WeatherReport},
};

/// Open-Meteo forecast endpoint. Free, no API key required.
pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Fetches current conditions for a coordinate pair.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    http: Client,
    base_url: String,
}

impl WeatherFetcher {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, OPEN_METEO_URL)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    /// Fetch current conditions at `coordinates`. One outbound request per
    /// call, no retry.
    pub async fn fetch(&self, coordinates: Coordinates) -> Result<WeatherReport, LookupError> {
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("latitude", coordinates.latitude.to_string().as_str()),
                ("longitude", coordinates.longitude.to_string().as_str()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m",
                ),
                ("wind_speed_unit", "ms"),
            ])
            .send()
            .await
            .map_err(|e| LookupError::ServiceUnavailable(format!("weather request failed: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            LookupError::ServiceUnavailable(format!("failed to read weather response: {e}"))
        })?;

        if !status.is_success() {
            return Err(LookupError::ServiceUnavailable(format!(
                "weather request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OmResponse = serde_json::from_str(&body).map_err(|e| {
            LookupError::ServiceUnavailable(format!("failed to parse weather JSON: {e}"))
        })?;

        let current = parsed.current;
        let report = WeatherReport {
            temperature_c: current.temperature_2m,
            humidity_pct: current.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
            wind_speed_mps: current.wind_speed_10m,
            weather_code: current.weather_code,
            condition: condition_text(current.weather_code).to_string(),
        };

        tracing::debug!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            code = report.weather_code,
            condition = %report.condition,
            "fetched current weather"
        );

        Ok(report)
    }
}

/// Korean display text for a WMO weather code.
///
/// Total over all inputs: unmapped codes yield "알 수 없음" instead of failing.
pub fn condition_text(code: u16) -> &'static str {
    match code {
        0 => "맑음",
        1 => "대체로 맑음",
        2 => "부분적으로 흐림",
        3 => "흐림",
        45 => "안개",
        48 => "서리 안개",
        51 => "가벼운 이슬비",
        53 => "보통 이슬비",
        55 => "강한 이슬비",
        56 => "가벼운 얼음 이슬비",
        57 => "강한 얼음 이슬비",
        61 => "약한 비",
        63 => "보통 비",
        65 => "강한 비",
        66 => "가벼운 얼음비",
        67 => "강한 얼음비",
        71 => "약한 눈",
        73 => "보통 눈",
        75 => "강한 눈",
        77 => "진눈깨비",
        80 => "약한 소나기",
        81 => "보통 소나기",
        82 => "강한 소나기",
        85 => "약한 눈 소나기",
        86 => "강한 눈 소나기",
        95 => "뇌우",
        96 => "약한 우박을 동반한 뇌우",
        99 => "강한 우박을 동반한 뇌우",
        _ => "알 수 없음",
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: u16,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current: OmCurrent,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
