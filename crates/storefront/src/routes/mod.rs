//! HTTP route handlers for the storefront shell.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Shell page with the four views
//! GET  /health                    - Health check
//!
//! # Views (HTMX)
//! POST /views/{view}              - Show a view and refresh it
//! POST /home                      - Reset form, back to the catalog
//!
//! # Cart (HTMX)
//! POST /cart/add/{product_id}     - Add one unit
//! POST /cart/remove/{product_id}  - Remove a line, reload the cart
//! POST /cart/badge                - Refresh the badge
//!
//! # Checkout (HTMX)
//! POST /checkout                  - Submit the checkout form
//! ```
//!
//! Every HTMX route runs one controller operation against a fresh
//! [`PageSurface`] and answers with what it recorded. The controller works on
//! the state of the browser named by the session cookie. Failures the user
//! has already been told about still answer 200 so the alert is shown.

pub mod cart;
pub mod checkout;
pub mod home;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::api::StoreBackend;
use crate::controller;
use crate::error::AppError;
use crate::state::AppState;
use crate::surface::PageSurface;

/// Create the cart routes router.
pub fn cart_routes<B: StoreBackend>() -> Router<AppState<B>> {
    Router::new()
        .route("/add/{product_id}", post(cart::add::<B>))
        .route("/remove/{product_id}", post(cart::remove::<B>))
        .route("/badge", post(cart::badge::<B>))
}

/// Create all routes for the storefront.
pub fn routes<B: StoreBackend>() -> Router<AppState<B>> {
    Router::new()
        // Shell page
        .route("/", get(home::shell::<B>))
        // Navigation
        .route("/views/{view}", post(home::show_view::<B>))
        .route("/home", post(home::reset::<B>))
        // Cart routes
        .nest("/cart", cart_routes::<B>())
        // Checkout
        .route("/checkout", post(checkout::submit::<B>))
}

/// Turn the outcome of a controller operation into the response.
fn respond(surface: PageSurface, result: controller::Result<()>) -> Response {
    match result {
        Ok(()) => surface.into_response(),
        Err(e) if e.reported_to_user() => surface.into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}
