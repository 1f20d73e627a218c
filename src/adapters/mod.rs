//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (WebDriver, HTTP APIs, blockchain RPC, file
//! I/O) and exposes the collector over HTTP. Each sub-module groups
//! adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `dom`: Rendered-page scraping through a WebDriver endpoint
//! - `rest`: GeckoTerminal / Hyperliquid pricing APIs
//! - `chain`: Pool contract reads via alloy-rs
//! - `persistence`: JSONL price log and atomic venue registry file
//! - `metrics`: Prometheus registry
//! - `http`: axum API, health probes and metrics endpoint

pub mod chain;
pub mod dom;
pub mod http;
pub mod metrics;
pub mod persistence;
pub mod rest;
