use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::net::IpAddr;

use crate::{error::LookupError, model::NetworkInfo};

pub const IPIFY_URL: &str = "https://api.ipify.org";
pub const HTTPBIN_IP_URL: &str = "https://httpbin.org/ip";
pub const IPECHO_URL: &str = "https://ipecho.net/plain";

/// One remote service able to report the caller's public IP address.
#[async_trait]
pub trait PublicIpProvider: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    async fn fetch(&self, http: &Client) -> Result<IpAddr, LookupError>;
}

/// <https://api.ipify.org>, answers with the bare address as plain text.
#[derive(Debug)]
pub struct Ipify {
    base_url: String,
}

impl Ipify {
    pub fn new() -> Self {
        Self { base_url: IPIFY_URL.to_string() }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for Ipify {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PublicIpProvider for Ipify {
    fn name(&self) -> &'static str {
        "ipify"
    }

    async fn fetch(&self, http: &Client) -> Result<IpAddr, LookupError> {
        fetch_plain_text_ip(http, &self.base_url).await
    }
}

/// <https://httpbin.org/ip>, answers with JSON `{"origin": "<addr>"}`.
#[derive(Debug)]
pub struct HttpbinIp {
    base_url: String,
}

impl HttpbinIp {
    pub fn new() -> Self {
        Self { base_url: HTTPBIN_IP_URL.to_string() }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for HttpbinIp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PublicIpProvider for HttpbinIp {
    fn name(&self) -> &'static str {
        "httpbin"
    }

    async fn fetch(&self, http: &Client) -> Result<IpAddr, LookupError> {
        #[derive(Debug, Deserialize)]
        struct Origin {
            origin: String,
        }

        let res = http.get(&self.base_url).send().await.map_err(|e| {
            LookupError::ServiceUnavailable(format!("public IP request failed: {e}"))
        })?;

        if !res.status().is_success() {
            return Err(LookupError::ServiceUnavailable(format!(
                "public IP request failed with status {}",
                res.status()
            )));
        }

        let parsed: Origin = res.json().await.map_err(|e| {
            LookupError::ServiceUnavailable(format!("failed to parse public IP JSON: {e}"))
        })?;

        // Behind a proxy the origin field lists multiple addresses; the first
        // one is the caller's.
        let first = parsed.origin.split(',').next().unwrap_or_default();
        parse_ip(first)
    }
}

/// <https://ipecho.net/plain>, answers with the bare address as plain text.
#[derive(Debug)]
pub struct Ipecho {
    base_url: String,
}

impl Ipecho {
    pub fn new() -> Self {
        Self { base_url: IPECHO_URL.to_string() }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into() }
    }
}

impl Default for Ipecho {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PublicIpProvider for Ipecho {
    fn name(&self) -> &'static str {
        "ipecho"
    }

    async fn fetch(&self, http: &Client) -> Result<IpAddr, LookupError> {
        fetch_plain_text_ip(http, &self.base_url).await
    }
}

async fn fetch_plain_text_ip(http: &Client, url: &str) -> Result<IpAddr, LookupError> {
    let res = http
        .get(url)
        .send()
        .await
        .map_err(|e| LookupError::ServiceUnavailable(format!("public IP request failed: {e}")))?;

    if !res.status().is_success() {
        return Err(LookupError::ServiceUnavailable(format!(
            "public IP request failed with status {}",
            res.status()
        )));
    }

    let body = res.text().await.map_err(|e| {
        LookupError::ServiceUnavailable(format!("failed to read public IP response: {e}"))
    })?;

    parse_ip(&body)
}

fn parse_ip(raw: &str) -> Result<IpAddr, LookupError> {
    raw.trim()
        .parse()
        .map_err(|_| LookupError::ServiceUnavailable(format!("not an IP address: '{}'", raw.trim())))
}

/// Discovers the machine's local and public addresses, best-effort.
///
/// Collection never fails: each address is independently `None` when its
/// lookup failed.
#[derive(Debug)]
pub struct NetworkCollector {
    http: Client,
    providers: Vec<Box<dyn PublicIpProvider>>,
}

impl NetworkCollector {
    /// Collector with the default public-IP services, tried in order.
    pub fn new(http: Client) -> Self {
        Self::with_providers(
            http,
            vec![
                Box::new(Ipify::new()),
                Box::new(HttpbinIp::new()),
                Box::new(Ipecho::new()),
            ],
        )
    }

    pub fn with_providers(http: Client, providers: Vec<Box<dyn PublicIpProvider>>) -> Self {
        Self { http, providers }
    }

    pub async fn collect(&self) -> NetworkInfo {
        let local_ip = match local_ip_address::local_ip() {
            Ok(ip) => Some(ip.to_string()),
            Err(err) => {
                tracing::warn!(error = %err, "local IP lookup failed");
                None
            }
        };

        let public_ip = self.public_ip().await.map(|ip| ip.to_string());

        NetworkInfo { local_ip, public_ip }
    }

    async fn public_ip(&self) -> Option<IpAddr> {
        for provider in &self.providers {
            match provider.fetch(&self.http).await {
                Ok(ip) => return Some(ip),
                Err(err) => {
                    tracing::warn!(provider = provider.name(), error = %err, "public IP lookup failed");
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn plain_server(body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    async fn failing_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn first_answering_provider_wins() {
        let down = failing_server().await;
        let up = plain_server("203.0.113.7").await;

        let collector = NetworkCollector::with_providers(
            Client::new(),
            vec![
                Box::new(Ipify::with_base_url(down.uri())),
                Box::new(Ipecho::with_base_url(up.uri())),
            ],
        );

        let info = collector.collect().await;
        assert_eq!(info.public_ip.as_deref(), Some("203.0.113.7"));
    }

    #[tokio::test]
    async fn collection_succeeds_when_every_service_is_down() {
        let down = failing_server().await;

        let collector = NetworkCollector::with_providers(
            Client::new(),
            vec![Box::new(Ipify::with_base_url(down.uri()))],
        );

        let info = collector.collect().await;
        assert!(info.public_ip.is_none());
    }

    #[tokio::test]
    async fn httpbin_origin_is_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"origin": "203.0.113.7, 198.51.100.2"})),
            )
            .mount(&server)
            .await;

        let provider = HttpbinIp::with_base_url(server.uri());
        let ip = provider.fetch(&Client::new()).await.expect("fetch must succeed");
        assert_eq!(ip.to_string(), "203.0.113.7");
    }

    #[tokio::test]
    async fn garbage_response_is_rejected() {
        let server = plain_server("<html>nope</html>").await;

        let provider = Ipify::with_base_url(server.uri());
        let err = provider.fetch(&Client::new()).await.unwrap_err();
        assert!(matches!(err, LookupError::ServiceUnavailable(_)));
    }
}
