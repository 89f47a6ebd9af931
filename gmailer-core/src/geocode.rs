use reqwest::Client;
use serde::Deserialize;

use crate::{error::LookupError, model::Coordinates};

/// Nominatim (OpenStreetMap) search endpoint. Free, no API key required.
pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Resolves a free-text address to coordinates.
#[derive(Debug, Clone)]
pub struct Geocoder {
    http: Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, NOMINATIM_URL)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    /// Resolve `address` to coordinates using the first (highest-confidence)
    /// match. One outbound request per call, no retry.
    ///
    /// An empty or whitespace-only address is `NotFound` without any request
    /// being issued.
    pub async fn resolve(&self, address: &str) -> Result<Coordinates, LookupError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(LookupError::NotFound);
        }

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "1"),
                ("accept-language", "ko"),
            ])
            .send()
            .await
            .map_err(|e| LookupError::ServiceUnavailable(format!("geocoding request failed: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            LookupError::ServiceUnavailable(format!("failed to read geocoding response: {e}"))
        })?;

        if !status.is_success() {
            return Err(LookupError::ServiceUnavailable(format!(
                "geocoding request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let places: Vec<Place> = serde_json::from_str(&body).map_err(|e| {
            LookupError::ServiceUnavailable(format!("failed to parse geocoding JSON: {e}"))
        })?;

        let place = places.into_iter().next().ok_or(LookupError::NotFound)?;
        let coordinates = place.into_coordinates()?;

        tracing::debug!(
            address,
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "resolved address"
        );

        Ok(coordinates)
    }
}

/// One search result. Nominatim serves `lat`/`lon` as JSON strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Place {
    fn into_coordinates(self) -> Result<Coordinates, LookupError> {
        let latitude = self.lat.parse().map_err(|_| {
            LookupError::ServiceUnavailable(format!("malformed latitude '{}'", self.lat))
        })?;
        let longitude = self.lon.parse().map_err(|_| {
            LookupError::ServiceUnavailable(format!("malformed longitude '{}'", self.lon))
        })?;

        Ok(Coordinates { latitude, longitude })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(server: &MockServer) -> Geocoder {
        Geocoder::with_base_url(Client::new(), server.uri())
    }

    #[tokio::test]
    async fn resolves_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "화성시 동탄"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "37.2004", "lon": "127.0728", "display_name": "동탄"}
            ])))
            .mount(&server)
            .await;

        let coords = geocoder(&server)
            .resolve("화성시 동탄")
            .await
            .expect("lookup must succeed");

        assert!((coords.latitude - 37.2004).abs() < 1e-9);
        assert!((coords.longitude - 127.0728).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_result_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let err = geocoder(&server).resolve("!@#$%^&*").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound));
    }

    #[tokio::test]
    async fn empty_address_issues_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let err = geocoder(&server).resolve("   ").await.unwrap_err();
        assert!(matches!(err, LookupError::NotFound));
    }

    #[tokio::test]
    async fn server_error_is_service_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = geocoder(&server).resolve("서울").await.unwrap_err();
        assert!(matches!(err, LookupError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn malformed_coordinates_are_service_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"lat": "not-a-number", "lon": "127.0"}
            ])))
            .mount(&server)
            .await;

        let err = geocoder(&server).resolve("서울").await.unwrap_err();
        assert!(matches!(err, LookupError::ServiceUnavailable(_)));
    }
}
