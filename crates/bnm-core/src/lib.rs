pub mod content;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod store;

pub use content::{ContentEncoding, ContentError, ContentStore, Fetched, StoredContent};
pub use error::{CoreError, CoreResult};
pub use metrics::{
    FetchOutcome, MetricsBackend, MetricsHandle, NoOpMetrics, PersistOutcome, ReservationMode,
    noop_metrics,
};
pub use protocol::CounterProtocol;
pub use store::{CounterStore, MemoryStore, Snapshot};

pub mod prelude {
    pub use crate::content::{ContentStore, Fetched};
    pub use crate::error::CoreError;
    pub use crate::protocol::CounterProtocol;
    pub use crate::store::{CounterStore, Snapshot};
}
