//! HTTP Transport
//!
//! A thin layer that maps three endpoints onto the store:
//!
//! ```text
//!   /store?token&key&value ──> RelayStore::store(key, value, token, clock.now())
//!   /get?key               ──> RelayStore::get(key)
//!   /sweep  (cron only)    ──> RelayStore::sweep(clock.now())
//! ```
//!
//! plus `/system/alive` and `/system/version` for health checks.
//!
//! The store and clock are injected through [`AppState`]; nothing here holds
//! state of its own.

pub mod error;
pub mod params;
pub mod routes;

pub use error::{ApiError, NOT_FOUND_BODY};
pub use params::FormValues;

use crate::storage::{Clock, RelayStore};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RelayStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<RelayStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }
}

/// Builds the complete application:
/// - `/store`, `/get`, `/sweep`
/// - `/system/alive`, `/system/version`
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::relay_routes())
        .nest("/system", routes::system_routes())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .with_state(state)
}

/// Serves the application on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
