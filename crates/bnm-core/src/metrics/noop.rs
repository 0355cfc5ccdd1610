use crate::metrics::backend::{FetchOutcome, MetricsBackend, PersistOutcome, ReservationMode};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_fetch(&self, _: &str, _: FetchOutcome) {}

    #[inline(always)]
    fn record_persist(&self, _: &str, _: PersistOutcome) {}

    #[inline(always)]
    fn record_reservation(&self, _: ReservationMode, _: bool) {}
}
