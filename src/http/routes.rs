//! Route handlers.
//!
//! Each handler pulls its parameters from the urlencoded body and query string
//! (see [`FormValues`]), hands them to the store, and turns the outcome into a
//! response. Missing parameters arrive as empty strings so the store's own
//! checks decide what is missing.

use crate::http::error::ApiError;
use crate::http::params::FormValues;
use crate::http::AppState;
use crate::VERSION;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::convert::Infallible;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

/// Header App Engine attaches to requests from its cron service.
pub const CRON_HEADER: &str = "x-appengine-cron";

/// `/store`, `/get` and `/sweep`.
pub fn relay_routes() -> Router<AppState> {
    Router::new()
        .route("/store", get(store_value).post(store_value))
        .route(
            "/get",
            get(get_value)
                .post(get_value)
                .layer::<_, Infallible>(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    HeaderValue::from_static("*"),
                ))
                .layer::<_, Infallible>(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-cache"),
                )),
        )
        .route("/sweep", get(sweep).post(sweep))
}

/// `/alive` and `/version`, nested under `/system`.
pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/alive", get(is_alive))
        .route("/version", get(version))
}

/// GET|POST /store?token=..&key=..&value=..
async fn store_value(
    State(state): State<AppState>,
    form: FormValues,
) -> Result<StatusCode, ApiError> {
    state.store.store(
        form.value("key"),
        form.value("value"),
        form.value("token"),
        state.clock.now(),
    )?;

    Ok(StatusCode::OK)
}

/// GET|POST /get?key=..
async fn get_value(
    State(state): State<AppState>,
    form: FormValues,
) -> Result<Response, ApiError> {
    let value = state.store.get(form.value("key"))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        value,
    )
        .into_response())
}

/// GET|POST /sweep
///
/// Only the platform's cron service may trigger a sweep from outside.
async fn sweep(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let trusted = headers
        .get(CRON_HEADER)
        .is_some_and(|v| v.as_bytes() == b"true");

    if !trusted {
        warn!("Invalid cron request");
        return Err(ApiError::UntrustedSweep);
    }

    let evicted = state.store.sweep(state.clock.now());
    info!(evicted = evicted, remaining = state.store.len(), "Swept {} entries", evicted);

    Ok(Json(json!({ "evicted": evicted })))
}

/// GET /system/alive
async fn is_alive() -> &'static str {
    "OK"
}

/// GET /system/version
async fn version() -> Json<serde_json::Value> {
    Json(json!({ "version": VERSION }))
}
