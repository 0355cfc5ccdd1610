mod id;
pub use id::CounterId;

mod counter_map;
pub use counter_map::CounterMap;

mod revision;
pub use revision::Revision;

mod repository;
pub use repository::Repository;

mod location;
pub use location::StoreLocation;

mod token;
pub use token::AccessToken;

mod constants;
pub use constants::DEFAULT_COUNTER_PATH;
