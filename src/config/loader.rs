//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::{AppConfig, PriceLocator};
use crate::domain::AdapterKind;

/// Environment variable overriding the config path.
pub const CONFIG_PATH_ENV: &str = "COLLECTOR_CONFIG";

/// Resolve the config path: `COLLECTOR_CONFIG` or the given default.
pub fn config_path(default: &str) -> String {
  std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| default.to_string())
}

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    venues = config.venues.len(),
    pages = config.adapters.dom.pages.len(),
    rpc_endpoints = config.adapters.rpc.endpoints.len(),
    interval_s = config.scheduler.interval_seconds,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Positive intervals, timeouts and budgets
/// - Non-empty endpoints
/// - Well-formed page profiles
/// - Seed venues with known adapter tags and unique pools
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.service.name.trim().is_empty(),
    "service.name must not be empty"
  );

  // Scheduler validation
  anyhow::ensure!(
    config.scheduler.interval_seconds > 0,
    "scheduler.interval_seconds must be positive"
  );
  anyhow::ensure!(
    config.scheduler.max_concurrent_fetches > 0,
    "scheduler.max_concurrent_fetches must be positive"
  );

  // Adapter validation
  let dom = &config.adapters.dom;
  anyhow::ensure!(
    !dom.webdriver_url.is_empty(),
    "adapters.dom.webdriver_url must not be empty"
  );
  anyhow::ensure!(
    dom.ready_timeout_seconds > 0 && dom.poll_interval_ms > 0 && dom.command_timeout_seconds > 0,
    "adapters.dom timeouts must be positive"
  );
  for (i, page) in dom.pages.iter().enumerate() {
    anyhow::ensure!(
      !page.dex_name.trim().is_empty() && !page.url.trim().is_empty(),
      "Page profile {i} needs dex_name and url"
    );
    match &page.locator {
      PriceLocator::Title { separator } => anyhow::ensure!(
        !separator.is_empty(),
        "Page profile {} ({}) has an empty title separator",
        i,
        page.dex_name
      ),
      PriceLocator::Xpath { expression } => anyhow::ensure!(
        !expression.trim().is_empty(),
        "Page profile {} ({}) has an empty xpath",
        i,
        page.dex_name
      ),
    }
  }

  let rest = &config.adapters.rest;
  anyhow::ensure!(
    !rest.geckoterminal_base_url.is_empty() && !rest.hyperliquid_info_url.is_empty(),
    "adapters.rest URLs must not be empty"
  );
  anyhow::ensure!(
    rest.timeout_seconds > 0,
    "adapters.rest.timeout_seconds must be positive"
  );
  anyhow::ensure!(
    rest.requests_per_minute > 0,
    "adapters.rest.requests_per_minute must be positive"
  );

  let rpc = &config.adapters.rpc;
  anyhow::ensure!(
    rpc.timeout_seconds > 0,
    "adapters.rpc.timeout_seconds must be positive"
  );
  let mut networks = HashSet::new();
  for endpoint in &rpc.endpoints {
    anyhow::ensure!(
      networks.insert(endpoint.network.to_ascii_lowercase()),
      "Duplicate RPC endpoint for network {}",
      endpoint.network
    );
  }

  // Seed venue validation
  let mut pools = HashSet::new();
  for (i, venue) in config.venues.iter().enumerate() {
    venue
      .adapter_kind
      .parse::<AdapterKind>()
      .with_context(|| format!("Venue {} ({}) has an invalid adapter_kind", i, venue.dex_name))?;
    anyhow::ensure!(
      pools.insert(venue.pool_address.to_ascii_lowercase()),
      "Venue {} ({}) repeats pool address {}",
      i,
      venue.dex_name,
      venue.pool_address
    );
  }

  Ok(())
}
