use std::sync::Arc;

use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder, proto::MetricFamily};

use bnm_core::{FetchOutcome, MetricsBackend, PersistOutcome, ReservationMode};

/// Prometheus metrics backend.
///
/// ## Label cardinality
/// All labels are bounded; counter ids are never used as labels:
/// - `store`: "github", "memory"
/// - `outcome`: see [`FetchOutcome`] / [`PersistOutcome`]
/// - `mode`: "peek", "increment"
/// - `created`: "true", "false"
#[derive(Clone)]
pub struct PrometheusMetrics {
    fetches: CounterVec,
    persists: CounterVec,
    reservations: CounterVec,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a new prometheus metrics backend with custom registry.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let fetches = CounterVec::new(
            Opts::new("fetches_total", "Counter file reads by outcome").namespace("bnm"),
            &["store", "outcome"],
        )?;
        registry.register(Box::new(fetches.clone()))?;

        let persists = CounterVec::new(
            Opts::new("persists_total", "Counter file writes by outcome").namespace("bnm"),
            &["store", "outcome"],
        )?;
        registry.register(Box::new(persists.clone()))?;

        let reservations = CounterVec::new(
            Opts::new("reservations_total", "Build numbers issued").namespace("bnm"),
            &["mode", "created"],
        )?;
        registry.register(Box::new(reservations.clone()))?;

        Ok(Self {
            fetches,
            persists,
            reservations,
            registry,
        })
    }

    /// Create a new prometheus metrics backend with default registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Get reference to underlying prometheus registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_fetch(&self, store: &str, outcome: FetchOutcome) {
        self.fetches
            .with_label_values(&[store, outcome.as_label()])
            .inc();
    }

    fn record_persist(&self, store: &str, outcome: PersistOutcome) {
        self.persists
            .with_label_values(&[store, outcome.as_label()])
            .inc();
    }

    fn record_reservation(&self, mode: ReservationMode, created: bool) {
        let created = if created { "true" } else { "false" };
        self.reservations
            .with_label_values(&[mode.as_label(), created])
            .inc();
    }
}
