//! Pricing API HTTP Client - Rate-limited JSON Client
//!
//! Wraps reqwest with a bounded timeout, a shared per-minute request
//! budget (governor) and translation of transport failures into the
//! adapter error taxonomy.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::RestConfig;
use crate::domain::AdapterError;

/// Rate-limited JSON client shared by every REST fetch.
///
/// `reqwest::Client` pools connections internally and is safe to use
/// from concurrent fetches; the limiter is lock-free.
pub struct RestClient {
    /// Underlying HTTP client.
    http: Client,
    /// Request budget against the public API.
    limiter: DefaultDirectRateLimiter,
    /// Request timeout (also reported in timeout errors).
    timeout: Duration,
}

impl RestClient {
    /// Create a new client from config.
    pub fn new(config: &RestConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let http = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(5)
            .build()
            .context("Failed to build HTTP client")?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            http,
            limiter: RateLimiter::direct(Quota::per_minute(per_minute)),
            timeout,
        })
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AdapterError> {
        let request = self.http.get(url).header("accept", "application/json");
        self.execute(request, url).await
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, AdapterError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(url).json(body);
        self.execute(request, url).await
    }

    /// Send once (no retry), check status, decode.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, AdapterError> {
        self.limiter.until_ready().await;

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url, status = status.as_u16(), "Pricing API returned error status");
            return Err(AdapterError::HttpError {
                status: status.as_u16(),
                body: truncate(&body, 256),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        debug!(url, bytes = text.len(), "Pricing API response received");

        serde_json::from_str(&text)
            .map_err(|e| AdapterError::ExtractionParseError(format!("invalid JSON body: {e}")))
    }

    /// Map a reqwest failure onto the adapter taxonomy.
    fn transport_error(&self, err: &reqwest::Error) -> AdapterError {
        if err.is_timeout() {
            AdapterError::ExtractionTimeout(self.timeout)
        } else if err.is_decode() {
            AdapterError::ExtractionParseError(err.to_string())
        } else {
            AdapterError::ConnectionError(err.to_string())
        }
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}
