//! Outbound HTTP transport
//!
//! The resolver and the weather client only need "GET this URL, give me the
//! body". That seam is the [`HttpFetcher`] trait so tests can substitute fakes.

use crate::{Result, WeatherCheckError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const USER_AGENT: &str = concat!("WeatherCheck/", env!("CARGO_PKG_VERSION"));

/// Fetches the body of a URL
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Issue a GET request and return the response body on a 2xx status
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// Production fetcher backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                WeatherCheckError::config(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    #[instrument(skip(self, url), fields(url = %redact_api_key(url)))]
    async fn get_text(&self, url: &str) -> Result<String> {
        let start = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            warn!("Request failed after {:.3}s: {}", start.elapsed().as_secs_f64(), e);
            WeatherCheckError::from(e)
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            return Err(WeatherCheckError::provider_unreachable(format!(
                "API request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        response.text().await.map_err(WeatherCheckError::from)
    }
}

/// Strip the `appid` value from a URL before it is logged
#[must_use]
pub fn redact_api_key(url: &str) -> String {
    match url.find("appid=") {
        Some(pos) => {
            let value_start = pos + "appid=".len();
            let rest = &url[value_start..];
            let value_end = rest.find('&').map_or(url.len(), |end| value_start + end);
            format!("{}***{}", &url[..value_start], &url[value_end..])
        }
        None => url.to_string(),
    }
}
