//! Markup fragments for the regions the view controller replaces.
//!
//! Each fragment is an askama partial rendered from small display structs.
//! Interactive elements get a stable DOM id and an `hx-post` route derived
//! from their [`Action`], and the same pair is returned as a [`Binding`].

use askama::Template;
use vitrina_core::{Cart, CartItem, Product};

use crate::surface::{Action, Binding, Fragment};

// =============================================================================
// Display Data
// =============================================================================

/// Whether a product's `imagen` is an image URL rather than a text glyph.
fn is_image_url(image: &str) -> bool {
    image.starts_with("https://") || image.starts_with("http://") || image.starts_with('/')
}

/// Catalog card display data.
#[derive(Clone)]
pub struct ProductCardView {
    pub button_id: String,
    pub route: String,
    /// Emoji glyph or image URL
    pub glyph: String,
    pub glyph_is_image: bool,
    pub name: String,
    pub description: String,
    pub price: String,
    action: Action,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let action = Action::AddToCart(product.id);
        Self {
            button_id: format!("add-to-cart-{}", product.id),
            route: action.route(),
            glyph: product.image.trim().to_string(),
            glyph_is_image: is_image_url(product.image.trim()),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.format_es_cl(),
            action,
        }
    }
}

/// Cart line display data.
#[derive(Clone)]
pub struct CartLineView {
    pub button_id: String,
    pub route: String,
    /// Emoji glyph or image URL
    pub glyph: String,
    pub glyph_is_image: bool,
    pub name: String,
    pub quantity: u32,
    pub line_total: String,
    action: Action,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        let action = Action::RemoveFromCart(item.product_id);
        Self {
            button_id: format!("remove-from-cart-{}", item.product_id),
            route: action.route(),
            glyph: item.product.image.trim().to_string(),
            glyph_is_image: is_image_url(item.product.image.trim()),
            name: item.product.name.clone(),
            quantity: item.quantity.get(),
            line_total: item.line_total().format_es_cl(),
            action,
        }
    }
}

/// Read-only checkout line display data.
#[derive(Clone)]
pub struct SummaryLineView {
    pub name: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartItem> for SummaryLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            name: item.product.name.clone(),
            quantity: item.quantity.get(),
            line_total: item.line_total().format_es_cl(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog grid fragment.
#[derive(Template)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate<'a> {
    pub cards: &'a [ProductCardView],
}

/// Cart lines fragment.
#[derive(Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate<'a> {
    pub lines: &'a [CartLineView],
}

/// Checkout summary fragment.
#[derive(Template)]
#[template(path = "partials/checkout_summary.html")]
pub struct CheckoutSummaryTemplate<'a> {
    pub lines: &'a [SummaryLineView],
}

// =============================================================================
// Fragments
// =============================================================================

/// One card per product, each bound to adding that product.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn product_grid(products: &[Product]) -> askama::Result<Fragment> {
    let cards: Vec<ProductCardView> = products.iter().map(ProductCardView::from).collect();
    let html = ProductGridTemplate { cards: &cards }.render()?;
    Ok(Fragment::new(html).with_bindings(cards.into_iter().map(|card| Binding {
        target: card.button_id,
        action: card.action,
    })))
}

/// The itemized cart, each line bound to removing its product.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn cart_items(cart: &Cart) -> askama::Result<Fragment> {
    let lines: Vec<CartLineView> = cart.items.iter().map(CartLineView::from).collect();
    let html = CartItemsTemplate { lines: &lines }.render()?;
    Ok(Fragment::new(html).with_bindings(lines.into_iter().map(|line| Binding {
        target: line.button_id,
        action: line.action,
    })))
}

/// The read-only summary shown next to the checkout form.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn checkout_summary(cart: &Cart) -> askama::Result<Fragment> {
    let lines: Vec<SummaryLineView> = cart.items.iter().map(SummaryLineView::from).collect();
    let html = CheckoutSummaryTemplate { lines: &lines }.render()?;
    Ok(Fragment::new(html))
}
