//! Shell page and navigation handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use super::respond;
use crate::api::StoreBackend;
use crate::error::Result;
use crate::state::AppState;
use crate::surface::PageSurface;

/// Shell page template.
#[derive(Template, WebTemplate)]
#[template(path = "shell.html")]
pub struct ShellTemplate {
    pub store_name: String,
}

/// Display the shell page.
///
/// The catalog and the badge load themselves once the page is up.
#[instrument(skip(state))]
pub async fn shell<B: StoreBackend>(State(state): State<AppState<B>>) -> impl IntoResponse {
    ShellTemplate {
        store_name: state.config().store_name.clone(),
    }
}

/// Show a view by name.
#[instrument(skip(state, session))]
pub async fn show_view<B: StoreBackend>(
    State(state): State<AppState<B>>,
    session: Session,
    Path(view): Path<String>,
) -> Result<Response> {
    let mut controller = state.controller(&session, PageSurface::new()).await?;
    let result = controller.show_view_named(&view).await;
    Ok(respond(controller.into_surface(), result))
}

/// Leave the confirmation and go back to the catalog.
#[instrument(skip(state, session))]
pub async fn reset<B: StoreBackend>(
    State(state): State<AppState<B>>,
    session: Session,
) -> Result<Response> {
    let mut controller = state.controller(&session, PageSurface::new()).await?;
    let result = controller.reset_to_home().await;
    Ok(respond(controller.into_surface(), result))
}
