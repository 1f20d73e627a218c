//! Chain Adapters - EVM Pool Reads over JSON-RPC
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider management keyed by network
//! - Pool price reads (`slot0`, token ordering, decimals, fee tier)
//! - Fixed-point conversion of `sqrtPriceX96`

pub mod pool;
pub mod pool_math;
pub mod provider;

pub use pool::OnChainRpcSource;
pub use provider::RpcProviders;
