//! Configuration Module - TOML-based Collector Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Endpoints, page profiles and seed venues are externalized here -
//! nothing venue-specific is hardcoded in the adapters.

pub mod loader;

use serde::Deserialize;

/// Top-level collector configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any adapter is constructed.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and logging.
  pub service: ServiceConfig,
  /// Periodic trigger settings.
  #[serde(default)]
  pub scheduler: SchedulerConfig,
  /// HTTP surface settings.
  #[serde(default)]
  pub http: HttpConfig,
  /// Persistence configuration.
  #[serde(default)]
  pub persistence: PersistenceConfig,
  /// Per-adapter settings.
  #[serde(default)]
  pub adapters: AdaptersConfig,
  /// Venues registered through the validation gate at startup.
  #[serde(default)]
  pub venues: Vec<VenueSeed>,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Orchestration schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
  /// Seconds between periodic runs.
  #[serde(default = "default_interval")]
  pub interval_seconds: u64,
  /// Fire one run immediately at startup.
  #[serde(default = "default_true")]
  pub run_on_start: bool,
  /// Maximum venue fetches in flight within one run.
  #[serde(default = "default_max_concurrent_fetches")]
  pub max_concurrent_fetches: usize,
}

impl Default for SchedulerConfig {
  fn default() -> Self {
    Self {
      interval_seconds: default_interval(),
      run_on_start: default_true(),
      max_concurrent_fetches: default_max_concurrent_fetches(),
    }
  }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
  /// Bind address for the API, health and metrics endpoints.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self {
      bind_address: default_bind_address(),
    }
  }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory holding `venues.json` and `prices/*.jsonl`.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
    }
  }
}

/// Settings for all three price sources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdaptersConfig {
  #[serde(default)]
  pub dom: DomConfig,
  #[serde(default)]
  pub rest: RestConfig,
  #[serde(default)]
  pub rpc: RpcConfig,
}

/// Rendered-page source (WebDriver).
#[derive(Debug, Clone, Deserialize)]
pub struct DomConfig {
  /// WebDriver endpoint (chromedriver / geckodriver).
  #[serde(default = "default_webdriver_url")]
  pub webdriver_url: String,
  /// Upper bound for the readiness predicate.
  #[serde(default = "default_ready_timeout")]
  pub ready_timeout_seconds: u64,
  /// Delay between readiness probes.
  #[serde(default = "default_poll_interval")]
  pub poll_interval_ms: u64,
  /// Timeout for each individual WebDriver command.
  #[serde(default = "default_command_timeout")]
  pub command_timeout_seconds: u64,
  /// Browser arguments for the session (headless etc).
  #[serde(default = "default_browser_args")]
  pub browser_args: Vec<String>,
  /// User agent override.
  #[serde(default = "default_user_agent")]
  pub user_agent: String,
  /// Page profiles keyed by venue name.
  #[serde(default)]
  pub pages: Vec<PageProfile>,
}

impl Default for DomConfig {
  fn default() -> Self {
    Self {
      webdriver_url: default_webdriver_url(),
      ready_timeout_seconds: default_ready_timeout(),
      poll_interval_ms: default_poll_interval(),
      command_timeout_seconds: default_command_timeout(),
      browser_args: default_browser_args(),
      user_agent: default_user_agent(),
      pages: Vec::new(),
    }
  }
}

/// How to scrape one venue page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageProfile {
  /// Venue this profile applies to (case-insensitive).
  pub dex_name: String,
  /// Page URL; `{network}`, `{pool_address}` and
  /// `{target_token_address}` are substituted from the venue.
  pub url: String,
  /// Where the price text lives.
  pub locator: PriceLocator,
  /// Text the page title must contain before extraction.
  pub ready_text: Option<String>,
  /// Close button of an announcement pop-up, clicked if present.
  pub dismiss_xpath: Option<String>,
  /// Pair label recorded with the quote.
  #[serde(default = "default_pair_label")]
  pub pair_label: String,
}

/// Location of the price on a rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceLocator {
  /// Leading segment of the document title.
  Title { separator: String },
  /// Text of the first element matching an XPath expression.
  Xpath { expression: String },
}

/// REST pricing service.
#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
  /// GeckoTerminal-compatible API base.
  #[serde(default = "default_geckoterminal_url")]
  pub geckoterminal_base_url: String,
  /// Hyperliquid info endpoint for native spot tokens.
  #[serde(default = "default_hyperliquid_url")]
  pub hyperliquid_info_url: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Shared request budget against the public API.
  #[serde(default = "default_requests_per_minute")]
  pub requests_per_minute: u32,
}

impl Default for RestConfig {
  fn default() -> Self {
    Self {
      geckoterminal_base_url: default_geckoterminal_url(),
      hyperliquid_info_url: default_hyperliquid_url(),
      timeout_seconds: default_timeout(),
      requests_per_minute: default_requests_per_minute(),
    }
  }
}

/// On-chain JSON-RPC source.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
  /// Per-call timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// RPC endpoint per network.
  #[serde(default)]
  pub endpoints: Vec<RpcEndpoint>,
}

impl Default for RpcConfig {
  fn default() -> Self {
    Self {
      timeout_seconds: default_timeout(),
      endpoints: Vec::new(),
    }
  }
}

/// One network's RPC endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcEndpoint {
  pub network: String,
  pub url: String,
}

/// Venue registered at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct VenueSeed {
  pub dex_name: String,
  pub adapter_kind: String,
  pub network: String,
  pub pool_address: String,
  pub target_token_address: String,
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_interval() -> u64 {
  60
}

fn default_max_concurrent_fetches() -> usize {
  4
}

fn default_bind_address() -> String {
  "0.0.0.0:5000".to_string()
}

fn default_data_dir() -> String {
  "data".to_string()
}

fn default_webdriver_url() -> String {
  "http://127.0.0.1:9515".to_string()
}

fn default_ready_timeout() -> u64 {
  20
}

fn default_poll_interval() -> u64 {
  500
}

fn default_command_timeout() -> u64 {
  30
}

fn default_browser_args() -> Vec<String> {
  vec![
    "--headless".to_string(),
    "--no-sandbox".to_string(),
    "--disable-dev-shm-usage".to_string(),
  ]
}

fn default_user_agent() -> String {
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
   Chrome/123.0.0.0 Safari/537.36"
    .to_string()
}

fn default_pair_label() -> String {
  "Unknown Pair".to_string()
}

fn default_geckoterminal_url() -> String {
  "https://api.geckoterminal.com/api/v2".to_string()
}

fn default_hyperliquid_url() -> String {
  "https://api.hyperliquid.xyz/info".to_string()
}

fn default_timeout() -> u64 {
  15
}

fn default_requests_per_minute() -> u32 {
  30
}
