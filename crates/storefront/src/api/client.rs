//! HTTP implementation of [`StoreBackend`] on top of `reqwest`.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;
use vitrina_core::{Cart, CartLineRequest, OrderReceipt, OrderRequest, Product, ProductId};

use super::{ApiError, StoreBackend};
use crate::config::BackendConfig;

const PRODUCTS_PATH: &str = "api/productos";
const CART_PATH: &str = "api/carrito";
const ADD_TO_CART_PATH: &str = "api/carrito/agregar";
const CHECKOUT_PATH: &str = "api/checkout";
const CLEAR_CART_PATH: &str = "api/limpiar-carrito";

/// How much of an error body ends up in logs and errors.
const BODY_EXCERPT_CHARS: usize = 500;

/// `GET /api/productos` wraps the list in an object.
#[derive(Deserialize)]
struct ProductList {
    productos: Vec<Product>,
}

// =============================================================================
// StoreApiClient
// =============================================================================

/// Client for the store backend's REST API.
#[derive(Clone)]
pub struct StoreApiClient {
    inner: Arc<StoreApiClientInner>,
}

struct StoreApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl StoreApiClient {
    /// Create a client for the configured backend.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a client for the configured backend on top of `client`.
    #[must_use]
    pub fn with_http_client(config: &BackendConfig, client: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(StoreApiClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
        }
    }

    /// The backend base URL (always ends with `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.inner.client.request(method, self.endpoint(path)?))
    }

    /// Send a request and decode its JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %excerpt(&body),
                "Store backend returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %excerpt(&body),
                "Failed to parse store backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request whose response is a free-form acknowledgement.
    async fn execute_ack(&self, request: RequestBuilder) -> Result<(), ApiError> {
        let ack: Value = self.execute(request).await?;
        check_ack(&ack)?;
        debug!(ack = %ack, "Store backend acknowledged");
        Ok(())
    }
}

impl StoreBackend for StoreApiClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let list: ProductList = self
            .execute(self.request(Method::GET, PRODUCTS_PATH)?)
            .await?;
        debug!(count = list.productos.len(), "Fetched products");
        Ok(list.productos)
    }

    #[instrument(skip(self), fields(product_id = %line.product_id, quantity = %line.quantity))]
    async fn add_to_cart(&self, line: CartLineRequest) -> Result<(), ApiError> {
        self.execute_ack(self.request(Method::POST, ADD_TO_CART_PATH)?.json(&line))
            .await
    }

    #[instrument(skip(self))]
    async fn get_cart(&self) -> Result<Cart, ApiError> {
        self.execute(self.request(Method::GET, CART_PATH)?).await
    }

    #[instrument(skip(self))]
    async fn remove_from_cart(&self, product_id: ProductId) -> Result<(), ApiError> {
        let path = format!("{CART_PATH}/{product_id}");
        self.execute_ack(self.request(Method::DELETE, &path)?).await
    }

    #[instrument(skip(self, order), fields(lines = order.items.len(), total = %order.total))]
    async fn checkout(&self, order: &OrderRequest) -> Result<OrderReceipt, ApiError> {
        let value: Value = self
            .execute(self.request(Method::POST, CHECKOUT_PATH)?.json(order))
            .await?;
        check_ack(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<(), ApiError> {
        self.execute_ack(self.request(Method::POST, CLEAR_CART_PATH)?)
            .await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Detect an error hidden in a 2xx acknowledgement.
///
/// Recognizes `{"error": msg}` and the `[{"error": msg}, status]` pair some
/// backends return with a 200 status.
fn check_ack(ack: &Value) -> Result<(), ApiError> {
    let object = match ack {
        Value::Array(items) => items.first(),
        other => Some(other),
    };

    match object.and_then(|o| o.get("error")) {
        Some(Value::String(message)) => Err(ApiError::Rejected(message.clone())),
        Some(Value::Null) | None => Ok(()),
        Some(other) => Err(ApiError::Rejected(other.to_string())),
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Path,
        http::StatusCode,
        routing::{delete, get, post},
    };
    use serde_json::json;
    use tokio::sync::Mutex;
    use vitrina_core::CheckoutForm;

    use crate::api::ErrorKind;

    fn client(base: &str) -> StoreApiClient {
        StoreApiClient::new(&BackendConfig::parse(base).unwrap())
    }

    #[test]
    fn test_endpoints_join_onto_base() {
        let client = client("http://127.0.0.1:8000");
        assert_eq!(
            client.endpoint(PRODUCTS_PATH).unwrap().as_str(),
            "http://127.0.0.1:8000/api/productos"
        );
        assert_eq!(
            client.endpoint("api/carrito/3").unwrap().as_str(),
            "http://127.0.0.1:8000/api/carrito/3"
        );
    }

    #[test]
    fn test_endpoints_keep_base_path_prefix() {
        let client = client("https://shop.example.cl/tienda");
        assert_eq!(
            client.endpoint(CLEAR_CART_PATH).unwrap().as_str(),
            "https://shop.example.cl/tienda/api/limpiar-carrito"
        );
    }

    #[test]
    fn test_check_ack_accepts_plain_messages() {
        assert!(check_ack(&json!({"mensaje": "Producto agregado"})).is_ok());
        assert!(check_ack(&json!(null)).is_ok());
        assert!(check_ack(&json!({"error": null})).is_ok());
    }

    #[test]
    fn test_check_ack_detects_error_object() {
        let err = check_ack(&json!({"error": "Producto no encontrado"})).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(msg) if msg == "Producto no encontrado"));
    }

    #[test]
    fn test_check_ack_detects_error_tuple() {
        let err = check_ack(&json!([{"error": "Producto no encontrado"}, 404])).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(_)));
    }

    #[test]
    fn test_product_list_shape() {
        let list: ProductList = serde_json::from_value(json!({
            "productos": [
                {"id": 1, "nombre": "Monster Lemon", "precio": 1990, "imagen": "🍋", "descripcion": "La mejor?"}
            ]
        }))
        .unwrap();
        assert_eq!(list.productos.len(), 1);
        assert_eq!(list.productos[0].id, ProductId::new(1));
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let body = "ñ".repeat(BODY_EXCERPT_CHARS + 10);
        assert_eq!(excerpt(&body).chars().count(), BODY_EXCERPT_CHARS);
    }

    // =========================================================================
    // Against a running backend
    // =========================================================================

    /// Requests the backend received, as `"METHOD /path"` and JSON body.
    type Received = Arc<Mutex<Vec<(String, Value)>>>;

    fn monster() -> Value {
        json!({"id": 1, "nombre": "Monster Lemon", "precio": 1990, "imagen": "🍋"})
    }

    fn backend(received: &Received) -> Router {
        let on_add = Arc::clone(received);
        let on_remove = Arc::clone(received);
        let on_checkout = Arc::clone(received);

        Router::new()
            .route(
                "/api/productos",
                get(|| async { Json(json!({"productos": [monster()]})) }),
            )
            .route(
                "/api/carrito",
                get(|| async {
                    Json(json!({
                        "items": [{"producto_id": 1, "producto": monster(), "cantidad": 2}],
                        "total": 3980,
                        "cantidad_items": 2
                    }))
                }),
            )
            .route(
                "/api/carrito/agregar",
                post(move |Json(body): Json<Value>| async move {
                    on_add
                        .lock()
                        .await
                        .push(("POST /api/carrito/agregar".to_string(), body));
                    Json(json!({"mensaje": "Producto agregado"}))
                }),
            )
            .route(
                "/api/carrito/{id}",
                delete(move |Path(id): Path<u32>| async move {
                    on_remove
                        .lock()
                        .await
                        .push((format!("DELETE /api/carrito/{id}"), Value::Null));
                    if id == 99 {
                        // Error pair answered with a 200 status
                        Json(json!([{"error": "Producto no encontrado"}, 404]))
                    } else {
                        Json(json!({"mensaje": "Producto eliminado"}))
                    }
                }),
            )
            .route(
                "/api/checkout",
                post(move |Json(body): Json<Value>| async move {
                    on_checkout
                        .lock()
                        .await
                        .push(("POST /api/checkout".to_string(), body));
                    Json(json!({"orden_id": "ORD-7", "session_token": "tok_123"}))
                }),
            )
            .route(
                "/api/limpiar-carrito",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "base de datos caída") }),
            )
    }

    /// Serve `router` on a free local port and point a client at it.
    async fn serve(router: Router) -> StoreApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        local_client(addr)
    }

    /// Client for a local backend, ignoring any proxy set in the environment.
    fn local_client(addr: std::net::SocketAddr) -> StoreApiClient {
        let config = BackendConfig::parse(&format!("http://{addr}")).unwrap();
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        StoreApiClient::with_http_client(&config, http)
    }

    #[tokio::test]
    async fn test_reads_decode_products_and_cart() {
        let received = Received::default();
        let client = serve(backend(&received)).await;

        let products = client.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Monster Lemon");

        let cart = client.get_cart().await.unwrap();
        assert_eq!(cart.item_count, 2);
        assert_eq!(cart.items[0].product_id, ProductId::new(1));
        assert_eq!(cart.total.format_es_cl(), "3.980");
    }

    #[tokio::test]
    async fn test_writes_send_expected_paths_and_bodies() {
        let received = Received::default();
        let client = serve(backend(&received)).await;

        client
            .add_to_cart(CartLineRequest::single(ProductId::new(3)))
            .await
            .unwrap();
        client.remove_from_cart(ProductId::new(1)).await.unwrap();

        let cart = client.get_cart().await.unwrap();
        let details = CheckoutForm {
            name: "Ana".to_string(),
            email: "a@b.cl".to_string(),
            phone: String::new(),
        }
        .validate()
        .unwrap();
        let receipt = client
            .checkout(&OrderRequest::from_cart(&cart, &details))
            .await
            .unwrap();
        assert_eq!(receipt.order_id.as_str(), "ORD-7");
        assert_eq!(receipt.session_token.as_deref(), Some("tok_123"));

        assert_eq!(
            *received.lock().await,
            vec![
                (
                    "POST /api/carrito/agregar".to_string(),
                    json!({"producto_id": 3, "cantidad": 1})
                ),
                ("DELETE /api/carrito/1".to_string(), Value::Null),
                (
                    "POST /api/checkout".to_string(),
                    json!({
                        "items": [{"producto_id": 1, "cantidad": 2}],
                        "total": 3980,
                        "nombre": "Ana",
                        "email": "a@b.cl"
                    })
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_pair_with_ok_status_is_rejected() {
        let received = Received::default();
        let client = serve(backend(&received)).await;

        let err = client.remove_from_cart(ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref msg) if msg == "Producto no encontrado"));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[tokio::test]
    async fn test_error_status_keeps_body_excerpt() {
        let received = Received::default();
        let client = serve(backend(&received)).await;

        let err = client.clear_cart().await.unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "base de datos caída");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let client = serve(
            Router::new()
                .route("/api/carrito", get(|| async { "<html>mantención</html>" }))
                .route("/api/productos", get(|| async { Json(json!({"items": []})) })),
        )
        .await;

        let err = client.get_cart().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
        assert_eq!(err.kind(), ErrorKind::Parse);

        // Valid JSON of the wrong shape is a parse error too
        let err = client.list_products().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = local_client(addr)
            .list_products()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Http(_)));
    }
}
