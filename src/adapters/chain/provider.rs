//! JSON-RPC Providers - alloy-rs 0.9 Connection Management
//!
//! Holds one type-erased provider per configured network. Providers are
//! built once at startup and shared by every on-chain fetch; alloy's
//! HTTP transport pools connections and is safe for concurrent calls.
//!
//! `ProviderBuilder::on_builtin()` yields a `BoxTransport` provider, so
//! the result can be stored directly as `dyn Provider`.

use std::collections::HashMap;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, keccak256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::transports::TransportError;
use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use crate::config::RpcConfig;
use crate::domain::AdapterError;

/// Type-erased alloy provider.
pub type SharedProvider = Arc<dyn Provider + Send + Sync>;

/// RPC providers keyed by lowercase network name.
pub struct RpcProviders {
    providers: HashMap<String, NetworkProvider>,
    /// Bound applied to every individual RPC call.
    call_timeout: Duration,
}

/// Provider for one network.
#[derive(Clone)]
pub struct NetworkProvider {
    network: String,
    provider: SharedProvider,
    call_timeout: Duration,
}

impl RpcProviders {
    /// Build a provider for every configured endpoint.
    ///
    /// Building does not contact the endpoint; reachability is checked
    /// per fetch.
    #[instrument(skip_all)]
    pub async fn connect(config: &RpcConfig) -> Result<Self> {
        let call_timeout = Duration::from_secs(config.timeout_seconds);
        let mut providers = HashMap::new();

        for endpoint in &config.endpoints {
            let provider = ProviderBuilder::new()
                .on_builtin(&endpoint.url)
                .await
                .with_context(|| format!("Invalid RPC URL for network {}", endpoint.network))?;
            let provider: SharedProvider = Arc::new(provider);

            info!(network = %endpoint.network, "RPC provider configured");

            let key = endpoint.network.to_ascii_lowercase();
            providers.insert(
                key,
                NetworkProvider {
                    network: endpoint.network.clone(),
                    provider,
                    call_timeout,
                },
            );
        }

        Ok(Self {
            providers,
            call_timeout,
        })
    }

    /// Registry with no endpoints (every on-chain fetch fails).
    pub fn empty(call_timeout: Duration) -> Self {
        Self {
            providers: HashMap::new(),
            call_timeout,
        }
    }

    /// Provider for a network, case-insensitive.
    pub fn get(&self, network: &str) -> Result<&NetworkProvider, AdapterError> {
        self.providers
            .get(&network.to_ascii_lowercase())
            .ok_or_else(|| AdapterError::ConnectionError(format!("no RPC endpoint configured for network {network}")))
    }

    /// Configured networks.
    pub fn networks(&self) -> impl Iterator<Item = &str> {
        self.providers.values().map(|p| p.network.as_str())
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }
}

impl NetworkProvider {
    /// `eth_blockNumber` reachability probe.
    ///
    /// No answer within the call timeout is a connection failure.
    pub async fn check_connection(&self) -> Result<u64, AdapterError> {
        let block = self
            .bounded(self.provider.get_block_number())
            .await
            .map_err(|_| {
                AdapterError::ConnectionError(format!(
                    "{} RPC connection check got no answer within {:?}",
                    self.network, self.call_timeout
                ))
            })?
            .map_err(|e| {
                AdapterError::ConnectionError(format!("{} RPC connection check failed: {e}", self.network))
            })?;

        debug!(network = %self.network, block, "RPC connection check passed");
        Ok(block)
    }

    /// `eth_call` of a zero-argument view function by signature,
    /// e.g. `"slot0()"`.
    pub async fn call_view(&self, to: Address, signature: &str) -> Result<Bytes, AdapterError> {
        let selector = &keccak256(signature.as_bytes())[..4];
        let tx = TransactionRequest::default()
            .to(to)
            .input(Bytes::copy_from_slice(selector).into());

        self.bounded(self.provider.call(&tx))
            .await?
            .map_err(|e| call_error(signature, to, &e))
    }

    async fn bounded<F, T>(&self, fut: F) -> Result<T, AdapterError>
    where
        F: IntoFuture<Output = T>,
    {
        tokio::time::timeout(self.call_timeout, fut)
            .await
            .map_err(|_| AdapterError::ExtractionTimeout(self.call_timeout))
    }
}

/// Classify a failed `eth_call`.
///
/// A JSON-RPC error response means the endpoint answered: a revert
/// (code 3 or an "execution reverted" message) says the contract has
/// no such view, anything else is an unusable answer. Only transport
/// failures are connection errors.
fn call_error(signature: &str, to: Address, err: &TransportError) -> AdapterError {
    match err.as_error_resp() {
        Some(payload) if payload.code == 3 || payload.message.contains("revert") => {
            AdapterError::NotFound(format!("{signature} reverted on {to}: {}", payload.message))
        }
        Some(payload) => AdapterError::ExtractionParseError(format!(
            "{signature} call to {to} answered error {}: {}",
            payload.code, payload.message
        )),
        None => AdapterError::ConnectionError(format!("{signature} call to {to} failed: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RpcEndpoint;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    /// Endpoint that accepts connections and never answers.
    async fn silent_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    /// Endpoint answering every request with an `execution reverted` error.
    async fn reverting_endpoint() -> String {
        let app = Router::new().route(
            "/",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "jsonrpc": "2.0",
                    "id": body["id"],
                    "error": { "code": 3, "message": "execution reverted" }
                }))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn providers_for(url: String) -> RpcProviders {
        let config = RpcConfig {
            timeout_seconds: 1,
            endpoints: vec![RpcEndpoint {
                network: "hyperevm".to_string(),
                url,
            }],
        };
        RpcProviders::connect(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_unconfigured_network_is_connection_error() {
        let providers = RpcProviders::empty(Duration::from_secs(1));
        assert!(matches!(
            providers.get("hyperevm"),
            Err(AdapterError::ConnectionError(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let config = RpcConfig {
            timeout_seconds: 1,
            endpoints: vec![RpcEndpoint {
                network: "HyperEVM".to_string(),
                url: "http://127.0.0.1:9".to_string(),
            }],
        };
        let providers = RpcProviders::connect(&config).await.unwrap();
        assert!(providers.get("hyperevm").is_ok());
        assert_eq!(providers.networks().collect::<Vec<_>>(), vec!["HyperEVM"]);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_connection_check() {
        let config = RpcConfig {
            timeout_seconds: 2,
            endpoints: vec![RpcEndpoint {
                network: "hyperevm".to_string(),
                url: "http://127.0.0.1:9".to_string(),
            }],
        };
        let providers = RpcProviders::connect(&config).await.unwrap();
        let err = providers
            .get("hyperevm")
            .unwrap()
            .check_connection()
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::ConnectionError(_)));
    }

    #[tokio::test]
    async fn test_silent_endpoint_fails_connection_check() {
        let providers = providers_for(silent_endpoint().await).await;
        let err = providers
            .get("hyperevm")
            .unwrap()
            .check_connection()
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::ConnectionError(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_reverted_view_call_is_not_found() {
        let providers = providers_for(reverting_endpoint().await).await;
        let err = providers
            .get("hyperevm")
            .unwrap()
            .call_view(Address::repeat_byte(0x11), "slot0()")
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::NotFound(_)), "got {err:?}");
        assert_eq!(err.kind(), "not_found");
    }
}
