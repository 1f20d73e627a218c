//! WebDriver Client - W3C WebDriver Protocol over HTTP
//!
//! Minimal client for the subset of the W3C WebDriver protocol the
//! page scraper needs: create a headless session, navigate, read the
//! document title, locate elements by XPath, read text, click, and
//! delete the session.
//!
//! A `WebDriverSession` owns one browser. It must be closed with
//! `close()`; if it is dropped without that (early return, panic, or a
//! cancelled future) the `Drop` impl schedules the DELETE on the
//! current runtime so no browser process is leaked.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::DomConfig;
use crate::domain::AdapterError;

/// W3C element reference key.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Error code returned when a locator matches nothing.
const NO_SUCH_ELEMENT: &str = "no such element";

/// Envelope of every WebDriver response.
#[derive(Debug, Deserialize)]
struct WireResponse {
    value: Value,
}

/// Connection settings for a WebDriver endpoint.
#[derive(Clone)]
pub struct WebDriverClient {
    http: Client,
    base_url: String,
    capabilities: Value,
    command_timeout: Duration,
}

impl WebDriverClient {
    /// Build a client from config. Does not contact the driver.
    pub fn new(config: &DomConfig) -> Result<Self> {
        let command_timeout = Duration::from_secs(config.command_timeout_seconds);
        let http = Client::builder()
            .timeout(command_timeout)
            .build()
            .context("Failed to build WebDriver HTTP client")?;

        let mut args = config.browser_args.clone();
        if !config.user_agent.is_empty() {
            args.push(format!("--user-agent={}", config.user_agent));
        }

        Ok(Self {
            http,
            base_url: config.webdriver_url.trim_end_matches('/').to_string(),
            capabilities: json!({
                "capabilities": {
                    "alwaysMatch": {
                        "browserName": "chrome",
                        "goog:chromeOptions": { "args": args }
                    }
                }
            }),
            command_timeout,
        })
    }

    /// Start a new isolated browser session.
    pub async fn new_session(&self) -> Result<WebDriverSession, AdapterError> {
        let value = self
            .command(Method::POST, "session", Some(&self.capabilities))
            .await?;

        let id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| AdapterError::ConnectionError("WebDriver returned no sessionId".to_string()))?
            .to_string();

        debug!(session = %id, "WebDriver session opened");

        Ok(WebDriverSession {
            client: self.clone(),
            id,
            closed: false,
        })
    }

    /// Issue one command and unwrap the `value` envelope.
    async fn command(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, AdapterError> {
        let url = format!("{}/{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(&e))?;

        let wire: WireResponse = serde_json::from_str(&text)
            .map_err(|e| AdapterError::ExtractionParseError(format!("malformed WebDriver response: {e}")))?;

        if status.is_success() {
            return Ok(wire.value);
        }

        let code = wire.value.get("error").and_then(Value::as_str).unwrap_or("unknown error");
        if code == NO_SUCH_ELEMENT {
            return Err(AdapterError::NotFound(code.to_string()));
        }

        let message = wire.value.get("message").and_then(Value::as_str).unwrap_or_default();
        Err(AdapterError::HttpError {
            status: status.as_u16(),
            body: format!("{code}: {message}"),
        })
    }

    fn transport_error(&self, err: &reqwest::Error) -> AdapterError {
        if err.is_timeout() {
            AdapterError::ExtractionTimeout(self.command_timeout)
        } else {
            AdapterError::ConnectionError(format!("WebDriver unreachable: {err}"))
        }
    }
}

/// One live browser session.
pub struct WebDriverSession {
    client: WebDriverClient,
    id: String,
    closed: bool,
}

impl WebDriverSession {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Navigate to a URL and wait for the initial load.
    pub async fn navigate(&self, url: &str) -> Result<(), AdapterError> {
        self.command(Method::POST, "url", Some(&json!({ "url": url })))
            .await
            .map(|_| ())
    }

    /// Current document title.
    pub async fn title(&self) -> Result<String, AdapterError> {
        let value = self.command(Method::GET, "title", None).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// First element matching an XPath, or `None` if absent.
    pub async fn find_xpath(&self, expression: &str) -> Result<Option<String>, AdapterError> {
        let body = json!({ "using": "xpath", "value": expression });
        match self.command(Method::POST, "element", Some(&body)).await {
            Ok(value) => Ok(value.get(ELEMENT_KEY).and_then(Value::as_str).map(str::to_string)),
            Err(AdapterError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Rendered text of an element.
    pub async fn element_text(&self, element: &str) -> Result<String, AdapterError> {
        let value = self
            .command(Method::GET, &format!("element/{element}/text"), None)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Click an element.
    pub async fn click(&self, element: &str) -> Result<(), AdapterError> {
        self.command(Method::POST, &format!("element/{element}/click"), Some(&json!({})))
            .await
            .map(|_| ())
    }

    /// Delete the session and release the browser.
    pub async fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.client.command(Method::DELETE, &format!("session/{}", self.id), None).await {
            warn!(session = %self.id, error = %e, "Failed to close WebDriver session");
        } else {
            debug!(session = %self.id, "WebDriver session closed");
        }
    }

    async fn command(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, AdapterError> {
        self.client
            .command(method, &format!("session/{}/{}", self.id, path), body)
            .await
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        let client = self.client.clone();
        let id = std::mem::take(&mut self.id);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(session = %id, "WebDriver session dropped without close, scheduling cleanup");
                handle.spawn(async move {
                    if let Err(e) = client.command(Method::DELETE, &format!("session/{id}"), None).await {
                        warn!(session = %id, error = %e, "Deferred WebDriver session close failed");
                    }
                });
            }
            Err(_) => warn!(session = %id, "WebDriver session leaked: no runtime to close it"),
        }
    }
}
