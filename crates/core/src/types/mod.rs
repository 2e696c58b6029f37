//! Core types for Vitrina.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod catalog;
pub mod checkout;
pub mod email;
pub mod id;
pub mod price;
pub mod view;

pub use catalog::{Cart, CartItem, CartLineRequest, Product, Quantity, QuantityError};
pub use checkout::{
    CheckoutDetails, CheckoutForm, CheckoutFormError, OrderLine, OrderReceipt, OrderRequest,
};
pub use email::{Email, EmailError};
pub use id::{OrderId, ProductId};
pub use price::Price;
pub use view::{UnknownViewError, View};
