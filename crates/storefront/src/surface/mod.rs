//! The controller's view of the page.
//!
//! A [`Surface`] is everything the view controller may touch in the DOM:
//! visibility of containers and panels, the markup of a few regions, a handful
//! of text slots, the checkout form, and the two feedback channels (blocking
//! alerts and transient notifications). Elements are addressed through the
//! closed [`Element`] enum, so a surface can only be missing an element, never
//! be asked for one that doesn't exist in the markup.
//!
//! Rendered markup travels as a [`Fragment`] together with its [`Binding`]s:
//! each interactive element in the fragment is bound to a typed [`Action`]
//! carrying the relevant id as data.

mod page;

pub use page::{HX_TRIGGER, PageSurface, events};

use thiserror::Error;
use vitrina_core::{ProductId, View};

/// Errors a surface can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The page has no element with the expected id.
    #[error("element #{0} is missing from the page")]
    MissingElement(&'static str),
}

/// Addressable page elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    /// Container of a top-level view.
    View(View),
    /// Catalog grid of product cards.
    ProductGrid,
    /// Panel shown when the cart has no lines.
    CartEmpty,
    /// Panel holding the itemized cart.
    CartContent,
    /// Cart line list.
    CartItems,
    /// Cart grand total.
    CartTotal,
    /// Read-only line list on the checkout view.
    CheckoutItems,
    /// Total next to the checkout summary.
    CheckoutTotal,
    /// Total on the pay button.
    SummaryTotal,
    /// Order id on the confirmation view.
    OrderId,
    /// Order total on the confirmation view.
    OrderTotal,
    /// Buyer email on the confirmation view.
    OrderEmail,
    /// Persistent cart item counter.
    CartBadge,
    /// The checkout form.
    CheckoutForm,
}

impl Element {
    /// Every element the controller addresses.
    pub const ALL: [Self; 17] = [
        Self::View(View::Catalog),
        Self::View(View::Cart),
        Self::View(View::Checkout),
        Self::View(View::Confirmation),
        Self::ProductGrid,
        Self::CartEmpty,
        Self::CartContent,
        Self::CartItems,
        Self::CartTotal,
        Self::CheckoutItems,
        Self::CheckoutTotal,
        Self::SummaryTotal,
        Self::OrderId,
        Self::OrderTotal,
        Self::OrderEmail,
        Self::CartBadge,
        Self::CheckoutForm,
    ];

    /// DOM id of the element.
    #[must_use]
    pub const fn dom_id(self) -> &'static str {
        match self {
            Self::View(view) => view.container_id(),
            Self::ProductGrid => "product-grid",
            Self::CartEmpty => "cart-empty",
            Self::CartContent => "cart-content",
            Self::CartItems => "cart-items",
            Self::CartTotal => "cart-total",
            Self::CheckoutItems => "checkout-items",
            Self::CheckoutTotal => "checkout-total",
            Self::SummaryTotal => "summary-total",
            Self::OrderId => "order-id",
            Self::OrderTotal => "order-total",
            Self::OrderEmail => "order-email",
            Self::CartBadge => "cart-badge",
            Self::CheckoutForm => "checkout-form",
        }
    }
}

/// A user action an element can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ShowView(View),
    AddToCart(ProductId),
    RemoveFromCart(ProductId),
    ResetToHome,
}

impl Action {
    /// Shell route that performs the action.
    #[must_use]
    pub fn route(&self) -> String {
        match self {
            Self::ShowView(view) => format!("/views/{}", view.slug()),
            Self::AddToCart(id) => format!("/cart/add/{id}"),
            Self::RemoveFromCart(id) => format!("/cart/remove/{id}"),
            Self::ResetToHome => "/home".to_string(),
        }
    }
}

/// An element inside a fragment bound to an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// DOM id of the bound element within the fragment.
    pub target: String,
    pub action: Action,
}

/// Rendered markup plus the actions its elements trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub html: String,
    pub bindings: Vec<Binding>,
}

impl Fragment {
    /// Create a fragment with no bindings.
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            bindings: Vec::new(),
        }
    }

    /// Add bindings to the fragment.
    #[must_use]
    pub fn with_bindings(mut self, bindings: impl IntoIterator<Item = Binding>) -> Self {
        self.bindings.extend(bindings);
        self
    }
}

/// Bindings of the static shell markup: navigation and the confirmation's
/// way back.
#[must_use]
pub fn shell_bindings() -> Vec<Binding> {
    [
        ("nav-catalog", Action::ShowView(View::Catalog)),
        ("nav-cart", Action::ShowView(View::Cart)),
        ("go-checkout", Action::ShowView(View::Checkout)),
        ("back-to-cart", Action::ShowView(View::Cart)),
        ("back-home", Action::ResetToHome),
    ]
    .into_iter()
    .map(|(target, action)| Binding {
        target: target.to_string(),
        action,
    })
    .collect()
}

/// The DOM operations available to the view controller.
pub trait Surface: Send {
    /// Show or hide an element.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::MissingElement`] if the element is absent.
    fn set_visible(&mut self, element: Element, visible: bool) -> Result<(), SurfaceError>;

    /// Replace an element's children with a fragment, registering its
    /// bindings and dropping the ones of the markup it replaces.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::MissingElement`] if the element is absent.
    fn replace(&mut self, element: Element, fragment: Fragment) -> Result<(), SurfaceError>;

    /// Replace an element's text content.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::MissingElement`] if the element is absent.
    fn set_text(&mut self, element: Element, text: &str) -> Result<(), SurfaceError>;

    /// Reset a form to its initial field values.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::MissingElement`] if the form is absent.
    fn reset_form(&mut self, element: Element) -> Result<(), SurfaceError>;

    /// Show a blocking error message.
    fn alert(&mut self, message: &str);

    /// Show a transient, non-blocking message.
    fn notify(&mut self, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_routes_carry_ids() {
        assert_eq!(Action::AddToCart(ProductId::new(3)).route(), "/cart/add/3");
        assert_eq!(
            Action::RemoveFromCart(ProductId::new(12)).route(),
            "/cart/remove/12"
        );
        assert_eq!(Action::ShowView(View::Cart).route(), "/views/cart");
        assert_eq!(Action::ResetToHome.route(), "/home");
    }

    #[test]
    fn test_view_elements_use_container_ids() {
        assert_eq!(Element::View(View::Checkout).dom_id(), "view-checkout");
        assert_eq!(Element::CartBadge.dom_id(), "cart-badge");
    }

    #[test]
    fn test_surface_error_display() {
        let err = SurfaceError::MissingElement("product-grid");
        assert_eq!(err.to_string(), "element #product-grid is missing from the page");
    }
}
