//! # Progress Relay - An Ephemeral, Authenticated Key-Value Relay
//!
//! Progress Relay lets one authorized writer publish short string values under
//! string keys and lets anyone read back the latest value for a key. Entries
//! live only briefly: a background sweep removes everything older than a fixed
//! age. Typical use is pushing job progress from a backend to a browser that
//! polls for it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Progress Relay                               │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐                                     │
//! │  │ HTTP Server │───>│   Routes    │  /store  /get  /sweep  /system/*    │
//! │  │   (axum)    │    │             │                                     │
//! │  └─────────────┘    └──────┬──────┘                                     │
//! │                            │                                            │
//! │                            ▼                                            │
//! │                     ┌──────────────────────────────────────────────┐    │
//! │                     │                RelayStore                    │    │
//! │                     │  ┌────────┐ ┌────────┐ ┌────────┐ ┌────────┐ │    │
//! │                     │  │Shard 0 │ │Shard 1 │ │Shard 2 │ │...N    │ │    │
//! │                     │  │RwLock  │ │RwLock  │ │RwLock  │ │shards  │ │    │
//! │                     │  └────────┘ └────────┘ └────────┘ └────────┘ │    │
//! │                     └──────────────────────────────────────────────┘    │
//! │                                               ▲                         │
//! │                                               │                         │
//! │                     ┌─────────────────────────┴───────────────────────┐ │
//! │                     │           SweepScheduler                        │ │
//! │                     │      (Background Tokio Task)                    │ │
//! │                     └─────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use progress_relay::http::{serve, AppState};
//! use progress_relay::storage::{start_sweep_scheduler, RelayStore, StoreConfig, SystemClock};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let store = Arc::new(RelayStore::new(StoreConfig::new("s3cret")));
//!     let _sweeper = start_sweep_scheduler(Arc::clone(&store), Duration::from_secs(600));
//!
//!     let listener = TcpListener::bind("0.0.0.0:8080").await?;
//!     let state = AppState::new(store, Arc::new(SystemClock));
//!     serve(listener, state, std::future::pending()).await
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`storage`]: the expiring store, write checks, clocks and the sweep scheduler
//! - [`http`]: routes mapping requests onto the store
//! - [`config`]: defaults, environment and command-line settings
//!
//! ## Expiry
//!
//! Reads never look at an entry's age. An entry is removed only when a sweep
//! finds it strictly older than the eviction threshold (60 seconds by
//! default). Sweeps run on a fixed interval (10 minutes by default) and can
//! also be triggered by the platform's cron service via `/sweep`.

pub mod config;
pub mod http;
pub mod storage;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigError, Invocation};
pub use http::{build_app, serve, AppState};
pub use storage::{
    start_sweep_scheduler, Clock, RelayStore, StoreConfig, StoreError, SweepConfig,
    SweepScheduler, SystemClock,
};

/// Version of Progress Relay
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
