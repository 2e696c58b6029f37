//! Test doubles for the store backend and the page.
//!
//! - [`InMemoryStore`] behaves like the demo backend: a fixed catalog, one
//!   additive cart, orders numbered `ORD-1`, `ORD-2`, ... It logs every call
//!   and can be told to fail an endpoint or to hold product listings.
//! - [`RecordingSurface`] keeps the page in maps and resolves simulated clicks
//!   to the actions bound to them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use reqwest::StatusCode;
use tokio::sync::{Mutex, Semaphore};
use vitrina_core::{
    Cart, CartItem, CartLineRequest, OrderId, OrderReceipt, OrderRequest, Price, Product,
    ProductId, Quantity, View,
};

use crate::api::{ApiError, StoreBackend};
use crate::surface::{Action, Binding, Element, Fragment, Surface, SurfaceError, shell_bindings};

// =============================================================================
// In-memory backend
// =============================================================================

/// Backend endpoints, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListProducts,
    AddToCart,
    GetCart,
    RemoveFromCart,
    Checkout,
    ClearCart,
}

/// A call received by the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListProducts,
    AddToCart(CartLineRequest),
    GetCart,
    RemoveFromCart(ProductId),
    Checkout,
    ClearCart,
}

#[derive(Debug, Default)]
struct StoreInner {
    products: Vec<Product>,
    lines: Vec<(ProductId, Quantity)>,
    orders: Vec<OrderRequest>,
    calls: Vec<Call>,
    failing: HashSet<Endpoint>,
    listing_gate: Option<Arc<Semaphore>>,
}

impl StoreInner {
    fn cart(&self) -> Cart {
        let items: Vec<CartItem> = self
            .lines
            .iter()
            .filter_map(|(id, quantity)| {
                self.products.iter().find(|p| p.id == *id).map(|product| CartItem {
                    product_id: *id,
                    product: product.clone(),
                    quantity: *quantity,
                })
            })
            .collect();
        Cart {
            total: items.iter().map(CartItem::line_total).sum(),
            item_count: u32::try_from(items.len()).unwrap_or(u32::MAX),
            items,
        }
    }

    fn record(&mut self, call: Call, endpoint: Endpoint) -> Result<(), ApiError> {
        self.calls.push(call);
        if self.failing.contains(&endpoint) {
            return Err(ApiError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: format!("{endpoint:?} is down"),
            });
        }
        Ok(())
    }
}

/// Store backend held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl InMemoryStore {
    /// A store selling `products`, with an empty cart.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                products,
                ..StoreInner::default()
            })),
        }
    }

    /// A store with three products at 1.990 each.
    #[must_use]
    pub fn demo() -> Self {
        let product = |id: i64, name: &str, image: &str, description: &str| Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            price: Price::from_units(1990),
            image: image.to_string(),
        };
        Self::new(vec![
            product(1, "Monster Lemon", "🍋", "La mejor"),
            product(2, "Monster Apple", "🍏", "Yum"),
            product(3, "Monster Melon", "🍈", "Es verde"),
        ])
    }

    /// Put a line in the cart without logging a call.
    pub async fn put_in_cart(&self, product_id: ProductId, quantity: Quantity) {
        let mut inner = self.inner.lock().await;
        add_line(&mut inner.lines, product_id, quantity);
    }

    /// Make every call to `endpoint` fail with 503.
    pub async fn fail(&self, endpoint: Endpoint) {
        self.inner.lock().await.failing.insert(endpoint);
    }

    /// Undo [`Self::fail`].
    pub async fn recover(&self, endpoint: Endpoint) {
        self.inner.lock().await.failing.remove(&endpoint);
    }

    /// Make product listings wait for a permit on the returned semaphore.
    pub async fn hold_product_listing(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.inner.lock().await.listing_gate = Some(Arc::clone(&gate));
        gate
    }

    /// Calls received so far, in order.
    pub async fn calls(&self) -> Vec<Call> {
        self.inner.lock().await.calls.clone()
    }

    /// Forget the calls received so far.
    pub async fn clear_calls(&self) {
        self.inner.lock().await.calls.clear();
    }

    /// Orders placed so far.
    pub async fn orders(&self) -> Vec<OrderRequest> {
        self.inner.lock().await.orders.clone()
    }

    /// The cart as `GET /api/carrito` would return it, without logging a call.
    pub async fn cart_snapshot(&self) -> Cart {
        self.inner.lock().await.cart()
    }
}

fn add_line(lines: &mut Vec<(ProductId, Quantity)>, product_id: ProductId, quantity: Quantity) {
    if let Some((_, existing)) = lines.iter_mut().find(|(id, _)| *id == product_id) {
        *existing = Quantity::new(existing.get().saturating_add(quantity.get())).unwrap_or(*existing);
    } else {
        lines.push((product_id, quantity));
    }
}

impl StoreBackend for InMemoryStore {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let gate = {
            let mut inner = self.inner.lock().await;
            inner.record(Call::ListProducts, Endpoint::ListProducts)?;
            inner.listing_gate.clone()
        };
        if let Some(gate) = gate {
            // A closed gate releases the listing too
            let _permit = gate.acquire().await;
        }
        Ok(self.inner.lock().await.products.clone())
    }

    async fn add_to_cart(&self, line: CartLineRequest) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().await;
        inner.record(Call::AddToCart(line), Endpoint::AddToCart)?;
        if !inner.products.iter().any(|p| p.id == line.product_id) {
            return Err(ApiError::Rejected("Producto no encontrado".to_string()));
        }
        add_line(&mut inner.lines, line.product_id, line.quantity);
        Ok(())
    }

    async fn get_cart(&self) -> Result<Cart, ApiError> {
        let mut inner = self.inner.lock().await;
        inner.record(Call::GetCart, Endpoint::GetCart)?;
        Ok(inner.cart())
    }

    async fn remove_from_cart(&self, product_id: ProductId) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().await;
        inner.record(Call::RemoveFromCart(product_id), Endpoint::RemoveFromCart)?;
        inner.lines.retain(|(id, _)| *id != product_id);
        Ok(())
    }

    async fn checkout(&self, order: &OrderRequest) -> Result<OrderReceipt, ApiError> {
        let mut inner = self.inner.lock().await;
        inner.record(Call::Checkout, Endpoint::Checkout)?;
        inner.orders.push(order.clone());
        Ok(OrderReceipt {
            order_id: OrderId::new(format!("ORD-{}", inner.orders.len())),
            session_token: None,
            checkout_session_id: None,
        })
    }

    async fn clear_cart(&self) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().await;
        inner.record(Call::ClearCart, Endpoint::ClearCart)?;
        inner.lines.clear();
        Ok(())
    }
}

// =============================================================================
// Recording surface
// =============================================================================

/// A page kept in memory.
///
/// Every [`Element`] exists unless removed with
/// [`RecordingSurface::remove_element`]. Elements start hidden and empty.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    missing: HashSet<Element>,
    visible: HashMap<Element, bool>,
    html: HashMap<Element, String>,
    text: HashMap<Element, String>,
    bindings: HashMap<Element, Vec<Binding>>,
    static_bindings: Vec<Binding>,
    alerts: Vec<String>,
    notices: Vec<String>,
    form_resets: Vec<Element>,
}

impl RecordingSurface {
    /// An empty page with no bound elements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A page with the shell's static navigation bound.
    #[must_use]
    pub fn page() -> Self {
        Self {
            static_bindings: shell_bindings(),
            ..Self::default()
        }
    }

    /// Remove an element from the page.
    pub fn remove_element(&mut self, element: Element) {
        self.missing.insert(element);
    }

    fn check(&self, element: Element) -> Result<(), SurfaceError> {
        if self.missing.contains(&element) {
            Err(SurfaceError::MissingElement(element.dom_id()))
        } else {
            Ok(())
        }
    }

    /// Whether the element is currently shown.
    #[must_use]
    pub fn is_visible(&self, element: Element) -> bool {
        self.visible.get(&element).copied().unwrap_or(false)
    }

    /// Views currently shown.
    #[must_use]
    pub fn visible_views(&self) -> Vec<View> {
        View::ALL
            .into_iter()
            .filter(|view| self.is_visible(Element::View(*view)))
            .collect()
    }

    /// Markup last placed in the element.
    #[must_use]
    pub fn html(&self, element: Element) -> Option<&str> {
        self.html.get(&element).map(String::as_str)
    }

    /// Text last placed in the element.
    #[must_use]
    pub fn text(&self, element: Element) -> Option<&str> {
        self.text.get(&element).map(String::as_str)
    }

    /// Bindings of the fragment currently inside the element.
    #[must_use]
    pub fn bindings(&self, element: Element) -> &[Binding] {
        self.bindings.get(&element).map(Vec::as_slice).unwrap_or_default()
    }

    /// Alerts shown so far.
    #[must_use]
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    /// Notifications shown so far.
    #[must_use]
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Forms reset so far.
    #[must_use]
    pub fn form_resets(&self) -> &[Element] {
        &self.form_resets
    }

    /// The action bound to the element with DOM id `target`, if any.
    #[must_use]
    pub fn click(&self, target: &str) -> Option<Action> {
        self.bindings
            .values()
            .flatten()
            .chain(&self.static_bindings)
            .find(|binding| binding.target == target)
            .map(|binding| binding.action)
    }
}

impl Surface for RecordingSurface {
    fn set_visible(&mut self, element: Element, visible: bool) -> Result<(), SurfaceError> {
        self.check(element)?;
        self.visible.insert(element, visible);
        Ok(())
    }

    fn replace(&mut self, element: Element, fragment: Fragment) -> Result<(), SurfaceError> {
        self.check(element)?;
        self.html.insert(element, fragment.html);
        self.bindings.insert(element, fragment.bindings);
        Ok(())
    }

    fn set_text(&mut self, element: Element, text: &str) -> Result<(), SurfaceError> {
        self.check(element)?;
        self.text.insert(element, text.to_string());
        Ok(())
    }

    fn reset_form(&mut self, element: Element) -> Result<(), SurfaceError> {
        self.check(element)?;
        self.form_resets.push(element);
        Ok(())
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}
