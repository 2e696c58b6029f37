//! Catalog and cart records as served by the store backend.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::Price;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "precio")]
    pub price: Price,
    /// Display glyph (usually an emoji) or image URL.
    #[serde(rename = "imagen", default)]
    pub image: String,
}

/// Error returned when a quantity of zero is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("quantity must be at least 1")]
pub struct QuantityError;

/// A positive item quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit, the amount added per "add to cart" click.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError`] for zero.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        match NonZeroU32::new(value) {
            Some(n) => Ok(Self(n)),
            None => Err(QuantityError),
        }
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One cart line: a product snapshot and how many units of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "producto_id")]
    pub product_id: ProductId,
    #[serde(rename = "producto")]
    pub product: Product,
    #[serde(rename = "cantidad")]
    pub quantity: Quantity,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Body of `POST /api/carrito/agregar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineRequest {
    #[serde(rename = "producto_id")]
    pub product_id: ProductId,
    #[serde(rename = "cantidad")]
    pub quantity: Quantity,
}

impl CartLineRequest {
    /// A request adding a single unit of `product_id`.
    #[must_use]
    pub const fn single(product_id: ProductId) -> Self {
        Self {
            product_id,
            quantity: Quantity::ONE,
        }
    }
}

/// The authoritative cart as returned by `GET /api/carrito`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: Price,
    /// Badge count exactly as the server reports it.
    #[serde(rename = "cantidad_items", default)]
    pub item_count: u32,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CART_JSON: &str = r#"{
        "items": [
            {
                "producto_id": 1,
                "cantidad": 2,
                "producto": {
                    "id": 1,
                    "nombre": "Monster Lemon",
                    "precio": 1990,
                    "imagen": "🍋",
                    "descripcion": "La mejor?"
                }
            }
        ],
        "total": 3980,
        "cantidad_items": 1
    }"#;

    #[test]
    fn test_cart_deserializes_backend_shape() {
        let cart: Cart = serde_json::from_str(CART_JSON).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count, 1);
        assert_eq!(cart.total, Price::from_units(3980));

        let line = &cart.items[0];
        assert_eq!(line.product_id, ProductId::new(1));
        assert_eq!(line.product.name, "Monster Lemon");
        assert_eq!(line.quantity.get(), 2);
        assert_eq!(line.line_total(), Price::from_units(3980));
    }

    #[test]
    fn test_empty_cart_defaults() {
        let cart: Cart = serde_json::from_str("{}").unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total, Price::ZERO);
        assert_eq!(cart.item_count, 0);
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        assert_eq!(Quantity::new(0), Err(QuantityError));
        assert!(serde_json::from_str::<CartItem>(
            r#"{"producto_id":1,"cantidad":0,"producto":{"id":1,"nombre":"x","precio":1}}"#
        )
        .is_err());
    }

    #[test]
    fn test_single_unit_request_body() {
        let body = serde_json::to_value(CartLineRequest::single(ProductId::new(4))).unwrap();
        assert_eq!(body, serde_json::json!({"producto_id": 4, "cantidad": 1}));
    }

    #[test]
    fn test_product_missing_optional_fields() {
        let product: Product =
            serde_json::from_str(r#"{"id": 5, "nombre": "Auriculares", "precio": 45990}"#).unwrap();
        assert_eq!(product.description, "");
        assert_eq!(product.image, "");
    }
}
