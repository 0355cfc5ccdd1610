mod domain;
pub use domain::DEFAULT_COUNTER_PATH;
pub use domain::{AccessToken, CounterId, CounterMap, Repository, Revision, StoreLocation};

mod error;
pub use error::{ModelError, ModelResult};

mod reservation;
pub use reservation::Reservation;

mod state;
pub use state::{DeferredState, state_keys};
