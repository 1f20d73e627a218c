//! Rendered-page Price Source - Scraping via WebDriver
//!
//! Implements `PriceSource` for `dom` venues. Each fetch opens its own
//! browser session, loads the venue page from its configured profile,
//! polls a readiness predicate until it holds or the deadline passes,
//! then reads the raw price text and normalizes it.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use super::webdriver::{WebDriverClient, WebDriverSession};
use crate::config::{DomConfig, PageProfile, PriceLocator};
use crate::domain::pricing::{parse_price_text, title_segment};
use crate::domain::{AdapterError, AdapterKind, PriceQuote, Venue};
use crate::ports::PriceSource;

/// Price source scraping rendered venue pages.
pub struct DomRenderSource {
    driver: WebDriverClient,
    pages: Vec<PageProfile>,
    ready_timeout: Duration,
    poll_interval: Duration,
}

impl DomRenderSource {
    pub fn new(driver: WebDriverClient, config: &DomConfig) -> Self {
        Self {
            driver,
            pages: config.pages.clone(),
            ready_timeout: Duration::from_secs(config.ready_timeout_seconds),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }

    /// Page profile for a venue, matched on `dex_name`.
    pub fn profile_for(&self, venue: &Venue) -> Result<&PageProfile, AdapterError> {
        self.pages
            .iter()
            .find(|p| p.dex_name.eq_ignore_ascii_case(venue.dex_name.trim()))
            .ok_or_else(|| AdapterError::NotFound(format!("no page profile for venue {}", venue.dex_name)))
    }

    /// Scrape one page inside an open session.
    async fn scrape(&self, session: &WebDriverSession, profile: &PageProfile, url: &str) -> Result<PriceQuote, AdapterError> {
        session.navigate(url).await?;

        let raw = self.wait_ready(session, profile).await?;
        let price = parse_price_text(&raw)
            .ok_or_else(|| AdapterError::ExtractionParseError(format!("price text {raw:?} is not numeric")))?;

        Ok(PriceQuote::new(price, profile.pair_label.clone()))
    }

    /// Poll until the page is ready; returns the raw price text.
    ///
    /// An announcement pop-up matching `dismiss_xpath` is clicked away
    /// the first time it shows up.
    async fn wait_ready(&self, session: &WebDriverSession, profile: &PageProfile) -> Result<String, AdapterError> {
        let deadline = Instant::now() + self.ready_timeout;
        let mut dismiss = profile.dismiss_xpath.as_deref();

        loop {
            if let Some(xpath) = dismiss {
                if let Some(button) = session.find_xpath(xpath).await? {
                    match session.click(&button).await {
                        Ok(()) => info!(dex = %profile.dex_name, "Dismissed announcement pop-up"),
                        Err(e) => debug!(error = %e, "Pop-up click failed"),
                    }
                    dismiss = None;
                }
            }

            if let Some(raw) = probe(session, profile).await? {
                return Ok(raw);
            }

            if Instant::now() >= deadline {
                return Err(AdapterError::ExtractionTimeout(self.ready_timeout));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl PriceSource for DomRenderSource {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Dom
    }

    #[instrument(skip(self, venue), fields(dex = %venue.dex_name))]
    async fn fetch(&self, venue: &Venue) -> Result<Option<PriceQuote>, AdapterError> {
        let profile = self.profile_for(venue)?;
        let url = render_url(&profile.url, venue);

        let session = self.driver.new_session().await?;
        debug!(session = session.id(), url = %url, "Scraping venue page");

        let result = self.scrape(&session, profile, &url).await;
        session.close().await;

        let quote = result?;
        debug!(spot = %quote.spot_price, "DOM quote extracted");
        Ok(Some(quote))
    }
}

/// One readiness check. `Some(raw)` once the predicate holds.
async fn probe(session: &WebDriverSession, profile: &PageProfile) -> Result<Option<String>, AdapterError> {
    let title = session.title().await?;
    if let Some(ready) = &profile.ready_text {
        if !title.contains(ready.as_str()) {
            return Ok(None);
        }
    }

    match &profile.locator {
        PriceLocator::Title { separator } => {
            let segment = title_segment(&title, separator);
            Ok((!segment.is_empty()).then(|| segment.to_string()))
        }
        PriceLocator::Xpath { expression } => match session.find_xpath(expression).await? {
            Some(element) => {
                let text = session.element_text(&element).await?;
                Ok((!text.trim().is_empty()).then_some(text))
            }
            None => Ok(None),
        },
    }
}

/// Substitute venue fields into a profile URL template.
pub fn render_url(template: &str, venue: &Venue) -> String {
    template
        .replace("{network}", &venue.network)
        .replace("{pool_address}", &venue.pool_address)
        .replace("{target_token_address}", &venue.target_token_address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn venue(dex: &str) -> Venue {
        Venue {
            id: Uuid::new_v4(),
            dex_name: dex.to_string(),
            adapter_kind: AdapterKind::Dom,
            network: "hyperliquid".to_string(),
            pool_address: "lighter-hype".to_string(),
            target_token_address: "HYPE".to_string(),
            created_at: Utc::now(),
        }
    }

    fn source(webdriver_url: &str) -> DomRenderSource {
        let config = DomConfig {
            webdriver_url: webdriver_url.to_string(),
            command_timeout_seconds: 2,
            pages: vec![PageProfile {
                dex_name: "Lighter".to_string(),
                url: "https://app.lighter.xyz/trade/{target_token_address}/".to_string(),
                locator: PriceLocator::Title {
                    separator: "•".to_string(),
                },
                ready_text: Some("HYPE".to_string()),
                dismiss_xpath: None,
                pair_label: "HYPE / USDC".to_string(),
            }],
            ..DomConfig::default()
        };
        DomRenderSource::new(WebDriverClient::new(&config).unwrap(), &config)
    }

    #[test]
    fn test_render_url_substitutes_fields() {
        assert_eq!(
            render_url("https://x/{network}/{pool_address}?t={target_token_address}", &venue("Lighter")),
            "https://x/hyperliquid/lighter-hype?t=HYPE"
        );
    }

    #[test]
    fn test_profile_lookup_is_case_insensitive() {
        let source = source("http://127.0.0.1:9");
        assert!(source.profile_for(&venue("lighter")).is_ok());
        assert!(matches!(
            source.profile_for(&venue("Based")),
            Err(AdapterError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_profile_fails_without_session() {
        let source = source("http://127.0.0.1:9");
        let err = source.fetch(&venue("Unknown DEX")).await.unwrap_err();
        assert!(matches!(err, AdapterError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unreachable_driver_is_connection_error() {
        let source = source("http://127.0.0.1:9");
        let err = source.fetch(&venue("Lighter")).await.unwrap_err();
        assert!(matches!(
            err,
            AdapterError::ConnectionError(_) | AdapterError::ExtractionTimeout(_)
        ));
    }
}
