//! Storage Module
//!
//! The relay's core: an expiring key-value store, the checks that guard its
//! write path, the clock it is driven by, and the background task that sweeps
//! stale entries out of it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RelayStore                            │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...64    │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │ sweep(clock.now())
//!              ┌─────────────┴─────────────┐
//!              │      SweepScheduler       │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use progress_relay::storage::{RelayStore, StoreConfig, StoreError};
//!
//! let store = RelayStore::new(StoreConfig::new("s3cret"));
//!
//! // Writes need the shared secret; reads do not.
//! assert!(store.store("build", "50%", "wrong", 0).is_err());
//! store.store("build", "50%", "s3cret", 0).unwrap();
//! assert_eq!(store.get("build").unwrap(), "50%");
//!
//! assert_eq!(store.sweep(61), 1);
//! assert_eq!(store.get("build"), Err(StoreError::NotFound));
//! ```

pub mod clock;
pub mod engine;
pub mod error;
pub mod expiry;
pub mod validate;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{Entry, RelayStore, StorageStats, StoreConfig, DEFAULT_MAX_AGE_SECS};
pub use error::{AuthFailure, StoreError};
pub use expiry::{start_sweep_scheduler, SweepConfig, SweepScheduler, DEFAULT_SWEEP_INTERVAL};
pub use validate::{MAX_KEY_LEN, MAX_VALUE_LEN};
