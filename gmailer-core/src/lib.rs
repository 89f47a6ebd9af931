//! Core library for the `gmailer` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Address-to-weather lookups (geocoding + current conditions)
//! - Local/public network address discovery
//! - Report formatting and SMTP delivery
//!
//! It is used by `gmailer-cli`, but can also be reused by other binaries or services.

use std::time::Duration;

pub mod config;
pub mod error;
pub mod geocode;
pub mod mail;
pub mod model;
pub mod network;
pub mod report;
pub mod weather;

pub use config::Config;
pub use error::LookupError;
pub use geocode::Geocoder;
pub use mail::Mailer;
pub use model::{Coordinates, EmailBody, NetworkInfo, WeatherReport};
pub use network::NetworkCollector;
pub use weather::WeatherFetcher;

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub(crate) const USER_AGENT: &str = concat!("gmailer/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by all lookup components.
///
/// Every outbound request carries the same timeout and user agent; components
/// receive the client at construction instead of building their own.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
}
