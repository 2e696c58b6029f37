//! Cart route handlers.
//!
//! The cart lives in the backend; these handlers only relay the action and
//! answer with the regions the controller refreshed.

use axum::{
    extract::{Path, State},
    response::Response,
};
use tower_sessions::Session;
use tracing::instrument;
use vitrina_core::ProductId;

use super::respond;
use crate::api::StoreBackend;
use crate::error::Result;
use crate::state::AppState;
use crate::surface::PageSurface;

/// Add one unit of a product.
#[instrument(skip(state, session))]
pub async fn add<B: StoreBackend>(
    State(state): State<AppState<B>>,
    session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<Response> {
    let mut controller = state.controller(&session, PageSurface::new()).await?;
    let result = controller.add_to_cart(product_id).await;
    Ok(respond(controller.into_surface(), result))
}

/// Remove a product's line and reload the cart.
#[instrument(skip(state, session))]
pub async fn remove<B: StoreBackend>(
    State(state): State<AppState<B>>,
    session: Session,
    Path(product_id): Path<ProductId>,
) -> Result<Response> {
    let mut controller = state.controller(&session, PageSurface::new()).await?;
    let result = controller.remove_from_cart(product_id).await;
    Ok(respond(controller.into_surface(), result))
}

/// Refresh the cart badge.
#[instrument(skip(state, session))]
pub async fn badge<B: StoreBackend>(
    State(state): State<AppState<B>>,
    session: Session,
) -> Result<Response> {
    let mut controller = state.controller(&session, PageSurface::new()).await?;
    let result = controller.refresh_cart_badge().await;
    Ok(respond(controller.into_surface(), result))
}
