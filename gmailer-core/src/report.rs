//! Report rendering and the one-shot enrichment pipeline.

use std::fmt::Write as _;

use crate::{
    geocode::Geocoder,
    model::{EmailBody, NetworkInfo, WeatherReport},
    network::NetworkCollector,
    weather::WeatherFetcher,
};

/// Placeholder for a network field whose lookup failed.
const UNAVAILABLE: &str = "조회 실패";

/// Render the email body from already-gathered data.
///
/// Pure and single-pass: the network section is always present (absent
/// fields render as "조회 실패"), the weather section is omitted entirely
/// when `weather` is `None`, and the user message comes last when non-empty.
pub fn render(
    network: &NetworkInfo,
    weather: Option<(&str, &WeatherReport)>,
    message: &str,
) -> EmailBody {
    EmailBody {
        text: render_text(network, weather, message),
        html: render_html(network, weather, message),
    }
}

fn render_text(
    network: &NetworkInfo,
    weather: Option<(&str, &WeatherReport)>,
    message: &str,
) -> String {
    let mut out = String::new();

    out.push_str("[네트워크 정보]\n");
    let _ = writeln!(out, "- 로컬 IP: {}", field(&network.local_ip));
    let _ = writeln!(out, "- 공용 IP: {}", field(&network.public_ip));

    if let Some((address, report)) = weather {
        out.push('\n');
        let _ = writeln!(out, "[날씨 정보 - {address}]");
        let _ = writeln!(out, "- 기온: {:.1}°C", report.temperature_c);
        let _ = writeln!(out, "- 습도: {}%", report.humidity_pct);
        let _ = writeln!(out, "- 풍속: {:.1} m/s", report.wind_speed_mps);
        let _ = writeln!(out, "- 날씨: {}", report.condition);
    }

    if !message.is_empty() {
        out.push('\n');
        out.push_str(message);
        out.push('\n');
    }

    out
}

fn render_html(
    network: &NetworkInfo,
    weather: Option<(&str, &WeatherReport)>,
    message: &str,
) -> String {
    let mut out = String::new();

    out.push_str("<html><body>\n");

    out.push_str("<h3>네트워크 정보</h3>\n<ul>\n");
    let _ = writeln!(out, "    <li><strong>로컬 IP:</strong> {}</li>", field(&network.local_ip));
    let _ = writeln!(out, "    <li><strong>공용 IP:</strong> {}</li>", field(&network.public_ip));
    out.push_str("</ul>\n");

    if let Some((address, report)) = weather {
        let _ = writeln!(out, "<h3>날씨 정보 - {}</h3>\n<ul>", escape_html(address));
        let _ = writeln!(out, "    <li><strong>기온:</strong> {:.1}°C</li>", report.temperature_c);
        let _ = writeln!(out, "    <li><strong>습도:</strong> {}%</li>", report.humidity_pct);
        let _ = writeln!(out, "    <li><strong>풍속:</strong> {:.1} m/s</li>", report.wind_speed_mps);
        let _ = writeln!(out, "    <li><strong>날씨:</strong> {}</li>", report.condition);
        out.push_str("</ul>\n");
    }

    if !message.is_empty() {
        let _ = writeln!(out, "<p>{}</p>", escape_html(message));
    }

    out.push_str("</body></html>\n");

    out
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(UNAVAILABLE)
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Gather everything and render one report.
///
/// Lookup failures degrade the body instead of failing the call: a failed
/// geocode or weather fetch drops the weather section, failed network
/// lookups leave their fields marked unavailable. The report is produced
/// even when every lookup is down.
pub async fn compile(
    geocoder: &Geocoder,
    fetcher: &WeatherFetcher,
    collector: &NetworkCollector,
    address: &str,
    message: &str,
) -> EmailBody {
    let network = collector.collect().await;

    let weather = match geocoder.resolve(address).await {
        Ok(coordinates) => match fetcher.fetch(coordinates).await {
            Ok(report) => Some(report),
            Err(err) => {
                tracing::warn!(address, error = %err, "weather lookup failed");
                None
            }
        },
        Err(err) => {
            tracing::warn!(address, error = %err, "geocoding failed");
            None
        }
    };

    render(&network, weather.as_ref().map(|report| (address, report)), message)
}
