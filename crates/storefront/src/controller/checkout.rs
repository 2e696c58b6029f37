//! Checkout as a typed pipeline.
//!
//! ```text
//! CheckoutDetails ──fetch_cart──▶ FreshCart ──submit──▶ PlacedOrder ──clear──▶ CompletedCheckout
//! ```
//!
//! Each step consumes the previous step's output, so the cart can only be
//! cleared after the order was accepted, and the order is always built from a
//! cart fetched for this submission.

use thiserror::Error;
use tracing::{info, instrument, warn};
use vitrina_core::{Cart, CheckoutDetails, Email, OrderReceipt, OrderRequest, Price};

use crate::api::{ApiError, StoreBackend};

/// Errors that abort a checkout before the order exists.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart could not be fetched.
    #[error("could not fetch the cart: {0}")]
    FetchCart(#[source] ApiError),

    /// The fresh cart has no lines.
    #[error("the cart is empty")]
    EmptyCart,

    /// The backend did not accept the order.
    #[error("could not submit the order: {0}")]
    SubmitOrder(#[source] ApiError),
}

/// Cart fetched for this checkout, known to have lines.
#[derive(Debug)]
pub struct FreshCart {
    cart: Cart,
}

impl FreshCart {
    /// The fetched cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }
}

/// Order accepted by the backend; the cart has not been cleared yet.
#[derive(Debug)]
pub struct PlacedOrder {
    pub receipt: OrderReceipt,
    /// Total captured from the fresh cart.
    pub total: Price,
    pub email: Email,
}

/// Finished checkout, ready for the confirmation view.
#[derive(Debug)]
pub struct CompletedCheckout {
    pub receipt: OrderReceipt,
    pub total: Price,
    pub email: Email,
    /// Whether the backend acknowledged clearing the cart.
    pub cart_cleared: bool,
}

/// Runs the checkout steps against a backend.
pub struct CheckoutPipeline<'a, B> {
    backend: &'a B,
    details: CheckoutDetails,
}

impl<'a, B: StoreBackend> CheckoutPipeline<'a, B> {
    /// Start a checkout for validated buyer details.
    #[must_use]
    pub const fn new(backend: &'a B, details: CheckoutDetails) -> Self {
        Self { backend, details }
    }

    /// Fetch the cart the order will be built from.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::FetchCart`] if the request fails and
    /// [`CheckoutError::EmptyCart`] if the cart has no lines.
    pub async fn fetch_cart(&self) -> Result<FreshCart, CheckoutError> {
        let cart = self
            .backend
            .get_cart()
            .await
            .map_err(CheckoutError::FetchCart)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(FreshCart { cart })
    }

    /// Submit the order built from `fresh`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SubmitOrder`] if the backend does not accept
    /// the order.
    pub async fn submit(&self, fresh: FreshCart) -> Result<PlacedOrder, CheckoutError> {
        let order = OrderRequest::from_cart(&fresh.cart, &self.details);
        let receipt = self
            .backend
            .checkout(&order)
            .await
            .map_err(CheckoutError::SubmitOrder)?;
        info!(order_id = %receipt.order_id, total = %order.total, "Order placed");
        Ok(PlacedOrder {
            receipt,
            total: order.total,
            email: self.details.email.clone(),
        })
    }

    /// Clear the backend cart after a placed order.
    ///
    /// The order exists at this point, so a failed clear is logged and the
    /// checkout still completes.
    pub async fn clear(&self, placed: PlacedOrder) -> CompletedCheckout {
        let cart_cleared = match self.backend.clear_cart().await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    error = %e,
                    order_id = %placed.receipt.order_id,
                    "Order placed but the cart could not be cleared"
                );
                false
            }
        };
        CompletedCheckout {
            receipt: placed.receipt,
            total: placed.total,
            email: placed.email,
            cart_cleared,
        }
    }

    /// Run every step in order.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; nothing after it runs.
    #[instrument(skip(self), fields(email_domain = %self.details.email.domain()))]
    pub async fn run(self) -> Result<CompletedCheckout, CheckoutError> {
        let fresh = self.fetch_cart().await?;
        let placed = self.submit(fresh).await?;
        Ok(self.clear(placed).await)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{Call, Endpoint, InMemoryStore};
    use vitrina_core::{CheckoutForm, ProductId, Quantity};

    fn details() -> CheckoutDetails {
        CheckoutForm {
            name: "Ana Pérez".to_string(),
            email: "ana@example.cl".to_string(),
            phone: String::new(),
        }
        .validate()
        .unwrap()
    }

    async fn store_with_cart() -> InMemoryStore {
        let store = InMemoryStore::demo();
        store.put_in_cart(ProductId::new(1), Quantity::new(2).unwrap()).await;
        store.clear_calls().await;
        store
    }

    #[tokio::test]
    async fn test_run_places_order_then_clears() {
        let store = store_with_cart().await;
        let done = CheckoutPipeline::new(&store, details()).run().await.unwrap();

        assert!(done.cart_cleared);
        assert_eq!(done.receipt.order_id.as_str(), "ORD-1");
        assert_eq!(done.total, Price::from_units(3980));
        assert_eq!(done.email.as_str(), "ana@example.cl");
        assert_eq!(
            store.calls().await,
            vec![Call::GetCart, Call::Checkout, Call::ClearCart]
        );
    }

    #[tokio::test]
    async fn test_empty_cart_never_posts_order() {
        let store = InMemoryStore::demo();
        let err = CheckoutPipeline::new(&store, details()).run().await.unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(store.calls().await, vec![Call::GetCart]);
    }

    #[tokio::test]
    async fn test_rejected_order_keeps_cart() {
        let store = store_with_cart().await;
        store.fail(Endpoint::Checkout).await;

        let err = CheckoutPipeline::new(&store, details()).run().await.unwrap_err();
        assert!(matches!(err, CheckoutError::SubmitOrder(_)));
        assert!(!store.calls().await.contains(&Call::ClearCart));
        assert!(!store.cart_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_clear_still_completes() {
        let store = store_with_cart().await;
        store.fail(Endpoint::ClearCart).await;

        let done = CheckoutPipeline::new(&store, details()).run().await.unwrap();
        assert!(!done.cart_cleared);
        assert_eq!(store.orders().await.len(), 1);
    }
}
