//! Checkout form validation and order payloads.

use serde::{Deserialize, Serialize};

use crate::types::catalog::{Cart, Quantity};
use crate::types::email::{Email, EmailError};
use crate::types::id::{OrderId, ProductId};
use crate::types::price::Price;

/// Errors found while validating the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutFormError {
    /// The name field is blank.
    #[error("name is required")]
    MissingName,
    /// The email field is not a valid address.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Raw checkout form fields, exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutForm {
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
}

impl CheckoutForm {
    /// Check the fields the order needs.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutFormError`] when the name is blank or the email is
    /// not syntactically valid.
    pub fn validate(&self) -> Result<CheckoutDetails, CheckoutFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CheckoutFormError::MissingName);
        }
        let email = Email::parse(&self.email)?;
        let phone = Some(self.phone.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        Ok(CheckoutDetails {
            name: name.to_owned(),
            email,
            phone,
        })
    }
}

/// Validated buyer details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
}

/// One `producto_id` + `cantidad` pair of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "producto_id")]
    pub product_id: ProductId,
    #[serde(rename = "cantidad")]
    pub quantity: Quantity,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    pub total: Price,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: Email,
    #[serde(rename = "telefono", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl OrderRequest {
    /// Build an order from a freshly fetched cart and the buyer's details.
    ///
    /// The total is the server's cart total, not a client-side sum.
    #[must_use]
    pub fn from_cart(cart: &Cart, details: &CheckoutDetails) -> Self {
        Self {
            items: cart
                .items
                .iter()
                .map(|item| OrderLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
            total: cart.total,
            name: details.name.clone(),
            email: details.email.clone(),
            phone: details.phone.clone(),
        }
    }
}

/// Response of `POST /api/checkout`.
///
/// Backends disagree on the id key (`orden_id` vs `order_id`); both are
/// accepted. The payment-session fields are kept when present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderReceipt {
    #[serde(rename = "orden_id", alias = "order_id")]
    pub order_id: OrderId,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub checkout_session_id: Option<String>,
}
