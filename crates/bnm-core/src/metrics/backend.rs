use std::sync::Arc;

/// Outcome of reading the counter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// File exists and parsed.
    Found,
    /// File does not exist yet.
    Missing,
    /// Store, decode or parse failure.
    Failed,
}

impl FetchOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchOutcome::Found => "found",
            FetchOutcome::Missing => "missing",
            FetchOutcome::Failed => "failed",
        }
    }
}

/// Outcome of writing the counter file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Existing file updated.
    Updated,
    /// File created.
    Created,
    /// Rejected because another writer got there first.
    Conflict,
    /// Any other failure.
    Failed,
}

impl PersistOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            PersistOutcome::Updated => "updated",
            PersistOutcome::Created => "created",
            PersistOutcome::Conflict => "conflict",
            PersistOutcome::Failed => "failed",
        }
    }
}

/// Which protocol call produced a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationMode {
    /// Reserved without persisting (deferred commit).
    Peek,
    /// Reserved and persisted in one cycle.
    Increment,
}

impl ReservationMode {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ReservationMode::Peek => "peek",
            ReservationMode::Increment => "increment",
        }
    }
}

/// Backend metrics collection interface.
///
/// Labels are bounded: counter ids are never used as label values.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a read of the counter file.
    ///
    /// # Arguments
    /// - `store`: Store implementation name
    /// - `outcome`: How the read ended
    fn record_fetch(&self, store: &str, outcome: FetchOutcome);
    /// Record a write of the counter file.
    ///
    /// # Arguments
    /// - `store`: Store implementation name
    /// - `outcome`: How the write ended
    fn record_persist(&self, store: &str, outcome: PersistOutcome);
    /// Record a computed reservation.
    ///
    /// Called once per successful `peek_and_reserve` / `atomic_increment`.
    fn record_reservation(&self, mode: ReservationMode, created: bool);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
