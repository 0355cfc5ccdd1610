//! Metrics collection abstraction for counter operations.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are injected into
//! [`crate::CounterStore`] and [`crate::CounterProtocol`].
mod backend;
pub use backend::{FetchOutcome, MetricsBackend, MetricsHandle, PersistOutcome, ReservationMode};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
