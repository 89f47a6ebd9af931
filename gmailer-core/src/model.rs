use serde::{Deserialize, Serialize};

/// Geographic point produced by geocoding, consumed by the weather fetcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions at one point, immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    /// WMO weather code as served by the weather service.
    pub weather_code: u16,
    /// Display text derived from `weather_code`; never empty.
    pub condition: String,
}

/// Machine addresses discovered best-effort; each field is independently
/// absent when its lookup failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub local_ip: Option<String>,
    pub public_ip: Option<String>,
}

impl NetworkInfo {
    pub fn is_empty(&self) -> bool {
        self.local_ip.is_none() && self.public_ip.is_none()
    }
}

/// Rendered email body, built fresh per send.
///
/// Both renderings carry the same information; they are sent together as a
/// `multipart/alternative` message.
#[derive(Debug, Clone)]
pub struct EmailBody {
    pub text: String,
    pub html: String,
}
