//! Store backend REST API.
//!
//! # Architecture
//!
//! - The backend is the source of truth for the catalog, the cart and orders
//! - No local cache: every read is a fresh request, every call is fire-once
//!   (no retries, no timeouts beyond the transport's own)
//! - [`StoreBackend`] is the seam between the view controller and HTTP, so the
//!   controller can run against [`StoreApiClient`] or an in-memory store
//!
//! # Endpoints
//!
//! ```text
//! GET    /api/productos          -> { productos: Product[] }
//! POST   /api/carrito/agregar    <- { producto_id, cantidad }
//! GET    /api/carrito            -> { items, total, cantidad_items }
//! DELETE /api/carrito/{id}
//! POST   /api/checkout           <- { items, total, nombre, email } -> { orden_id, ... }
//! POST   /api/limpiar-carrito
//! ```

mod client;

use std::future::Future;

pub use client::StoreApiClient;

use reqwest::StatusCode;
use thiserror::Error;
use vitrina_core::{Cart, CartLineRequest, OrderReceipt, OrderRequest, Product, ProductId};

/// Errors that can occur when talking to the store backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or its body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// First part of the response body.
        body: String,
    },

    /// The backend answered 2xx but the acknowledgement carried an error.
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint URL could not be built from the configured base URL.
    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Coarse classification used for user-facing messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request failed, non-2xx status, or a rejected acknowledgement.
    Network,
    /// Malformed JSON.
    Parse,
}

impl ApiError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Parse,
            Self::Http(_) | Self::Status { .. } | Self::Rejected(_) | Self::Url(_) => {
                ErrorKind::Network
            }
        }
    }
}

/// Operations the storefront needs from the store backend.
///
/// Implementations are cheap to clone and shared between requests.
pub trait StoreBackend: Clone + Send + Sync + 'static {
    /// `GET /api/productos`
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// `POST /api/carrito/agregar`
    fn add_to_cart(
        &self,
        line: CartLineRequest,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /api/carrito`
    fn get_cart(&self) -> impl Future<Output = Result<Cart, ApiError>> + Send;

    /// `DELETE /api/carrito/{product_id}`
    fn remove_from_cart(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /api/checkout`
    fn checkout(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderReceipt, ApiError>> + Send;

    /// `POST /api/limpiar-carrito`
    fn clear_cart(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Rejected("Producto no encontrado".to_string());
        assert_eq!(
            err.to_string(),
            "backend rejected the request: Producto no encontrado"
        );

        let err = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        };
        assert_eq!(err.to_string(), "backend returned 502 Bad Gateway: upstream down");
    }

    #[test]
    fn test_error_kind() {
        let parse = serde_json::from_str::<Cart>("{").unwrap_err();
        assert_eq!(ApiError::Parse(parse).kind(), ErrorKind::Parse);
        assert_eq!(
            ApiError::Rejected("nope".to_string()).kind(),
            ErrorKind::Network
        );
    }
}
