//! The storefront view controller.
//!
//! # Architecture
//!
//! - One operation per user action: each fetches from the [`StoreBackend`],
//!   renders a fragment and updates the [`Surface`]
//! - The backend is authoritative: nothing is mutated locally, every change is
//!   followed by a re-fetch
//! - Client state lives in [`SharedState`], one per browser; view refreshes
//!   carry a [`Ticket`] and drop their response (view switch included) if the
//!   user navigated away meanwhile
//! - Backend failures are logged with detail and reported to the user with a
//!   generic message; the last rendering stays on screen
//! - A missing page element is fatal and propagated
//!
//! # Operations
//!
//! ```text
//! show_view          hide all views, show one, refresh it
//! load_products      GET /api/productos   -> catalog grid
//! add_to_cart        POST /api/carrito/agregar, then badge
//! load_cart          GET /api/carrito     -> cart lines, total, badge
//! remove_from_cart   DELETE /api/carrito/{id}, then load_cart
//! load_checkout      GET /api/carrito     -> checkout summary
//! submit_checkout    validate, GET cart, POST order, POST clear, confirmation
//! refresh_cart_badge GET /api/carrito     -> badge
//! reset_to_home      reset form, drop order, catalog, badge
//! ```

mod checkout;
mod state;

pub use checkout::{CheckoutError, CheckoutPipeline, CompletedCheckout, FreshCart, PlacedOrder};
pub use state::{ControllerState, SharedState, Ticket};

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use vitrina_core::{
    Cart, CartLineRequest, CheckoutForm, CheckoutFormError, ProductId, UnknownViewError, View,
};

use crate::api::{ApiError, StoreBackend};
use crate::render;
use crate::surface::{Action, Element, Surface, SurfaceError};

/// Messages shown to the user.
pub mod messages {
    pub const PRODUCT_ADDED: &str = "¡Producto agregado al carrito!";
    pub const PRODUCT_REMOVED: &str = "Producto eliminado del carrito";
    pub const LOAD_PRODUCTS_FAILED: &str = "Error al cargar los productos";
    pub const ADD_FAILED: &str = "Error al agregar el producto";
    pub const LOAD_CART_FAILED: &str = "Error al cargar el carrito";
    pub const REMOVE_FAILED: &str = "Error al eliminar el producto";
    pub const LOAD_CHECKOUT_FAILED: &str = "Error al cargar el resumen de tu compra";
    pub const CHECKOUT_FAILED: &str = "Error al procesar el pago. Intenta nuevamente.";
    pub const EMPTY_CART: &str = "Tu carrito está vacío";
    pub const MISSING_NAME: &str = "Ingresa tu nombre";
    pub const INVALID_EMAIL: &str = "Ingresa un email válido";
}

/// Errors returned by controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// A backend call failed. The user has been alerted.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The checkout did not place an order. The user has been alerted.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The checkout form is incomplete. The user has been alerted.
    #[error("invalid checkout form: {0}")]
    InvalidForm(#[from] CheckoutFormError),

    /// The page is missing an element the controller needs.
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// A fragment template failed to render.
    #[error("template error: {0}")]
    Render(#[from] askama::Error),

    /// A view name matched no view.
    #[error(transparent)]
    UnknownView(#[from] UnknownViewError),
}

impl ControllerError {
    /// Whether the page itself is broken, as opposed to a failed request.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Surface(_) | Self::Render(_))
    }

    /// Whether the surface already shows the user an error message.
    #[must_use]
    pub const fn reported_to_user(&self) -> bool {
        matches!(
            self,
            Self::Api(_) | Self::Checkout(_) | Self::InvalidForm(_)
        )
    }
}

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, ControllerError>;

fn fatal(err: SurfaceError) -> ControllerError {
    error!(error = %err, "Page element missing");
    ControllerError::Surface(err)
}

fn render_failed(err: askama::Error) -> ControllerError {
    error!(error = %err, "Failed to render fragment");
    ControllerError::Render(err)
}

/// Drives one [`Surface`] against a [`StoreBackend`].
pub struct ViewController<B, S> {
    backend: B,
    surface: S,
    state: SharedState,
}

impl<B: StoreBackend, S: Surface> ViewController<B, S> {
    /// Create a controller sharing `state` with the other controllers of the
    /// same browser.
    #[must_use]
    pub const fn new(backend: B, surface: S, state: SharedState) -> Self {
        Self {
            backend,
            surface,
            state,
        }
    }

    /// The surface being driven.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Consume the controller, returning its surface.
    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Copy of the browser's controller state.
    pub async fn snapshot(&self) -> ControllerState {
        self.state.snapshot().await
    }

    /// Run the operation an action is bound to.
    ///
    /// # Errors
    ///
    /// Returns the error of the dispatched operation.
    pub async fn dispatch(&mut self, action: Action) -> Result<()> {
        debug!(?action, "Dispatching action");
        match action {
            Action::ShowView(view) => self.show_view(view).await,
            Action::AddToCart(id) => self.add_to_cart(id).await,
            Action::RemoveFromCart(id) => self.remove_from_cart(id).await,
            Action::ResetToHome => self.reset_to_home().await,
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Show the view named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::UnknownView`] without touching the page if
    /// the name matches no view, otherwise as [`Self::show_view`].
    pub async fn show_view_named(&mut self, name: &str) -> Result<()> {
        let view = name
            .parse::<View>()
            .inspect_err(|e| warn!(error = %e, "Unknown view requested"))?;
        self.show_view(view).await
    }

    /// Hide every view but `view` and refresh it.
    ///
    /// The view switch is applied once the refresh is done, and only if no
    /// later navigation started meanwhile; a superseded navigation leaves
    /// the page as the later one set it.
    ///
    /// # Errors
    ///
    /// Returns an error if a view container is missing or the refresh fails.
    #[instrument(skip(self, view), fields(view = %view))]
    pub async fn show_view(&mut self, view: View) -> Result<()> {
        let ticket = self.state.navigate(view).await;

        let refreshed = match view {
            View::Catalog => self.refresh_products(ticket).await,
            View::Cart => self.refresh_cart(ticket).await,
            View::Checkout => self.refresh_checkout(ticket).await,
            View::Confirmation => Ok(()),
        };

        if !self.state.is_current(ticket).await {
            debug!(%view, "Discarding superseded navigation");
            return refreshed;
        }
        for candidate in View::ALL {
            self.surface
                .set_visible(Element::View(candidate), candidate == view)
                .map_err(fatal)?;
        }
        refreshed
    }

    /// Discard the held order and go back to the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the form is missing or the catalog fails to load.
    /// The badge is refreshed either way.
    #[instrument(skip(self))]
    pub async fn reset_to_home(&mut self) -> Result<()> {
        self.surface
            .reset_form(Element::CheckoutForm)
            .map_err(fatal)?;
        self.state.update(|s| s.current_order = None).await;

        let shown = self.show_view(View::Catalog).await;
        self.refresh_cart_badge().await?;
        shown
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Reload the catalog grid.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Api`] after alerting the user if the
    /// products cannot be fetched; the previous grid stays.
    #[instrument(skip(self))]
    pub async fn load_products(&mut self) -> Result<()> {
        let ticket = self.state.ticket(View::Catalog).await;
        self.refresh_products(ticket).await
    }

    async fn refresh_products(&mut self, ticket: Ticket) -> Result<()> {
        let products = match self.backend.list_products().await {
            Ok(products) => products,
            Err(e) => return self.load_failed(ticket, e, messages::LOAD_PRODUCTS_FAILED).await,
        };

        let fragment = render::product_grid(&products).map_err(render_failed)?;
        let count = products.len();
        if !self.state.commit(ticket, |s| s.products = products).await {
            debug!(view = %ticket.view(), "Discarding stale product list");
            return Ok(());
        }
        self.surface
            .replace(Element::ProductGrid, fragment)
            .map_err(fatal)?;
        debug!(count, "Catalog rendered");
        Ok(())
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Api`] after alerting the user if the backend
    /// does not accept the line.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn add_to_cart(&mut self, product_id: ProductId) -> Result<()> {
        if let Err(e) = self
            .backend
            .add_to_cart(CartLineRequest::single(product_id))
            .await
        {
            error!(error = %e, kind = ?e.kind(), "Failed to add product to cart");
            self.surface.alert(messages::ADD_FAILED);
            return Err(e.into());
        }

        info!("Product added to cart");
        self.surface.notify(messages::PRODUCT_ADDED);
        self.refresh_cart_badge().await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Reload the cart view and the badge.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Api`] after alerting the user if the cart
    /// cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load_cart(&mut self) -> Result<()> {
        let ticket = self.state.ticket(View::Cart).await;
        self.refresh_cart(ticket).await
    }

    async fn refresh_cart(&mut self, ticket: Ticket) -> Result<()> {
        let cart = match self.backend.get_cart().await {
            Ok(cart) => cart,
            Err(e) => return self.load_failed(ticket, e, messages::LOAD_CART_FAILED).await,
        };

        let fragment = render::cart_items(&cart).map_err(render_failed)?;
        let snapshot = cart.clone();
        if self.state.commit(ticket, |s| s.cart = Some(snapshot)).await {
            let empty = cart.is_empty();
            self.surface
                .set_visible(Element::CartEmpty, empty)
                .map_err(fatal)?;
            self.surface
                .set_visible(Element::CartContent, !empty)
                .map_err(fatal)?;
            self.surface
                .replace(Element::CartItems, fragment)
                .map_err(fatal)?;
            self.surface
                .set_text(Element::CartTotal, &cart.total.format_es_cl())
                .map_err(fatal)?;
        } else {
            debug!(view = %ticket.view(), "Discarding stale cart");
        }

        // The cart is fresh either way
        self.set_badge(&cart)
    }

    /// Delete a cart line, then reload the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Api`] after alerting the user if the delete
    /// or the reload fails.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&mut self, product_id: ProductId) -> Result<()> {
        let removed = self.backend.remove_from_cart(product_id).await;
        if let Err(e) = &removed {
            error!(error = %e, kind = ?e.kind(), "Failed to remove product from cart");
            self.surface.alert(messages::REMOVE_FAILED);
        }

        self.load_cart().await?;
        removed?;

        info!("Product removed from cart");
        self.surface.notify(messages::PRODUCT_REMOVED);
        Ok(())
    }

    /// Update the badge from a fresh cart. Failures are logged only.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Surface`] if the badge is missing.
    #[instrument(skip(self))]
    pub async fn refresh_cart_badge(&mut self) -> Result<()> {
        match self.backend.get_cart().await {
            Ok(cart) => self.set_badge(&cart),
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Failed to refresh cart badge");
                Ok(())
            }
        }
    }

    fn set_badge(&mut self, cart: &Cart) -> Result<()> {
        self.surface
            .set_text(Element::CartBadge, &cart.item_count.to_string())
            .map_err(fatal)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Reload the read-only summary on the checkout view.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Api`] after alerting the user if the cart
    /// cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load_checkout(&mut self) -> Result<()> {
        let ticket = self.state.ticket(View::Checkout).await;
        self.refresh_checkout(ticket).await
    }

    async fn refresh_checkout(&mut self, ticket: Ticket) -> Result<()> {
        let cart = match self.backend.get_cart().await {
            Ok(cart) => cart,
            Err(e) => return self.load_failed(ticket, e, messages::LOAD_CHECKOUT_FAILED).await,
        };

        let fragment = render::checkout_summary(&cart).map_err(render_failed)?;
        let total = cart.total.format_es_cl();
        if !self.state.commit(ticket, |s| s.cart = Some(cart)).await {
            debug!(view = %ticket.view(), "Discarding stale checkout summary");
            return Ok(());
        }
        self.surface
            .replace(Element::CheckoutItems, fragment)
            .map_err(fatal)?;
        self.surface
            .set_text(Element::CheckoutTotal, &total)
            .map_err(fatal)?;
        self.surface
            .set_text(Element::SummaryTotal, &total)
            .map_err(fatal)
    }

    /// Validate the form, place the order, clear the cart and confirm.
    ///
    /// Nothing is sent when the form is invalid. When the order is not
    /// accepted the cart is left as it was and the form keeps its values.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidForm`] or
    /// [`ControllerError::Checkout`] after alerting the user.
    #[instrument(skip_all)]
    pub async fn submit_checkout(&mut self, form: &CheckoutForm) -> Result<()> {
        let details = match form.validate() {
            Ok(details) => details,
            Err(e) => {
                debug!(error = %e, "Checkout form rejected");
                self.surface.alert(match e {
                    CheckoutFormError::MissingName => messages::MISSING_NAME,
                    CheckoutFormError::InvalidEmail(_) => messages::INVALID_EMAIL,
                });
                return Err(e.into());
            }
        };

        let done = match CheckoutPipeline::new(&self.backend, details).run().await {
            Ok(done) => done,
            Err(e) => {
                if matches!(e, CheckoutError::EmptyCart) {
                    warn!("Checkout submitted with an empty cart");
                    self.surface.alert(messages::EMPTY_CART);
                } else {
                    error!(error = %e, "Checkout failed");
                    self.surface.alert(messages::CHECKOUT_FAILED);
                }
                return Err(e.into());
            }
        };

        self.surface
            .set_text(Element::OrderId, done.receipt.order_id.as_str())
            .map_err(fatal)?;
        self.surface
            .set_text(Element::OrderTotal, &done.total.format_es_cl())
            .map_err(fatal)?;
        self.surface
            .set_text(Element::OrderEmail, done.email.as_str())
            .map_err(fatal)?;
        self.state
            .update(|s| {
                s.current_order = Some(done.receipt);
                s.cart = None;
            })
            .await;

        self.show_view(View::Confirmation).await?;
        self.refresh_cart_badge().await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Report a failed view refresh, unless the view is no longer current.
    async fn load_failed(&mut self, ticket: Ticket, err: ApiError, message: &str) -> Result<()> {
        if !self.state.is_current(ticket).await {
            debug!(view = %ticket.view(), error = %err, "Ignoring failure of stale refresh");
            return Ok(());
        }
        error!(view = %ticket.view(), error = %err, kind = ?err.kind(), "Failed to load view");
        self.surface.alert(message);
        Err(err.into())
    }
}
