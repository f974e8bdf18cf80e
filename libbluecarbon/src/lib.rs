//! Blue carbon registry - in-memory credit registry for coastal restoration
//!
//! This library holds the registry's single state tree and the pure reducer
//! that evolves it: project MRV review, credit issuance and retirement, a
//! credit marketplace, live sensor streams and a notification/activity feed.
//! Everything starts from a seeded demo fixture and can be reset to it.

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod notifications;
pub mod seed;
pub mod selectors;
pub mod sensors;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{ActionError, ConfigError, RegistryError, Result};
pub use sensors::SampleGenerator;
pub use store::{Action, AppState, Store, StoreOptions, SubscriptionId};
pub use types::*;
