//! Checkout route handler.

use axum::{Form, extract::State, response::Response};
use tower_sessions::Session;
use tracing::instrument;
use vitrina_core::CheckoutForm;

use super::respond;
use crate::api::StoreBackend;
use crate::error::Result;
use crate::state::AppState;
use crate::surface::PageSurface;

/// Submit the checkout form.
///
/// On success the response fills the confirmation and shows it; on failure
/// it only carries the alert, so the form keeps what the user typed.
#[instrument(skip_all)]
pub async fn submit<B: StoreBackend>(
    State(state): State<AppState<B>>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut controller = state.controller(&session, PageSurface::new()).await?;
    let result = controller.submit_checkout(&form).await;
    Ok(respond(controller.into_surface(), result))
}
