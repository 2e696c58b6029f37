//! Vitrina storefront library.
//!
//! A storefront front end over a REST store backend: the catalog, the cart,
//! checkout and the order confirmation, served as one HTMX page whose regions
//! the [`controller::ViewController`] refreshes.
//!
//! This crate provides the storefront as a library, allowing it to be tested
//! against an in-memory backend and reused by the binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod state;
pub mod surface;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use axum::{Router, middleware::from_fn, routing::get};
use tower_http::trace::TraceLayer;

use crate::api::StoreBackend;
use crate::state::AppState;

/// Build the storefront router.
///
/// Sentry layers are left to the caller so tests can run without a client.
pub fn app<B: StoreBackend>(state: AppState<B>) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .with_state(state)
        .layer(session_layer)
        .layer(from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::request_span))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}
