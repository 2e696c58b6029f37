//! The storefront's mutually exclusive top-level views.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returned when a view name matches no view container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view: {0:?}")]
pub struct UnknownViewError(pub String);

/// A top-level view. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Catalog,
    Cart,
    Checkout,
    Confirmation,
}

impl View {
    /// Every view, in navigation order.
    pub const ALL: [Self; 4] = [Self::Catalog, Self::Cart, Self::Checkout, Self::Confirmation];

    /// URL slug of the view.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Cart => "cart",
            Self::Checkout => "checkout",
            Self::Confirmation => "confirmation",
        }
    }

    /// DOM id of the view's container.
    #[must_use]
    pub const fn container_id(self) -> &'static str {
        match self {
            Self::Catalog => "view-catalog",
            Self::Cart => "view-cart",
            Self::Checkout => "view-checkout",
            Self::Confirmation => "view-confirmation",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for View {
    type Err = UnknownViewError;

    /// Accepts the English slugs and the Spanish names older links use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "catalog" | "catalogo" => Ok(Self::Catalog),
            "cart" | "carrito" => Ok(Self::Cart),
            "checkout" => Ok(Self::Checkout),
            "confirmation" | "confirmacion" => Ok(Self::Confirmation),
            other => Err(UnknownViewError(other.to_string())),
        }
    }
}
