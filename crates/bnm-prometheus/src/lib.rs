//! Prometheus metrics backend for build-number operations.
//!
//! This crate provides a [`PrometheusMetrics`] implementation of [`bnm_core::MetricsBackend`].
//! A single CI step is too short-lived to be scraped, so the usual exposition path is
//! [`PrometheusMetrics::encode_text`] written to a node-exporter textfile or pushed to a gateway.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use bnm_core::{CounterStore, MemoryStore};
//! use bnm_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let store = CounterStore::new(Arc::new(MemoryStore::new()), "counters.json")
//!     .with_metrics(Arc::new(metrics.clone()));
//!
//! // ... run protocol calls against `store` ...
//! let text = metrics.encode_text()?;
//! # let _ = (store, text);
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `bnm_fetches_total{store, outcome}` - Counter
//! - `bnm_persists_total{store, outcome}` - Counter
//! - `bnm_reservations_total{mode, created}` - Counter

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
