//! Client-held state of the view controller.
//!
//! The backend owns everything that matters; the controller only remembers
//! what it last fetched (for the current view), the order it is confirming,
//! and which view is active. Navigation bumps a generation counter so that
//! responses started under an earlier navigation can be recognized and
//! dropped.

use std::sync::Arc;

use tokio::sync::Mutex;
use vitrina_core::{Cart, OrderReceipt, Product, View};

/// Snapshot of the controller's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    /// Products rendered in the catalog grid.
    pub products: Vec<Product>,
    /// Cart last rendered by the cart or checkout view.
    pub cart: Option<Cart>,
    /// Order being confirmed, until the user goes back home.
    pub current_order: Option<OrderReceipt>,
    /// The visible view.
    pub active_view: View,
    generation: u64,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            cart: None,
            current_order: None,
            active_view: View::Catalog,
            generation: 0,
        }
    }
}

impl ControllerState {
    /// Number of navigations so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        self.generation == ticket.generation && self.active_view == ticket.view
    }
}

/// Captures the navigation a view refresh was started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    view: View,
}

impl Ticket {
    /// The view the refresh renders into.
    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }
}

/// Controller state of one browser, shared by the controllers serving its
/// requests.
///
/// The lock is held only for short, synchronous updates, never across a
/// request to the backend.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<Mutex<ControllerState>>,
}

impl SharedState {
    /// Create state with the catalog active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `view` the active view and start a new navigation.
    pub async fn navigate(&self, view: View) -> Ticket {
        let mut state = self.inner.lock().await;
        state.generation += 1;
        state.active_view = view;
        Ticket {
            generation: state.generation,
            view,
        }
    }

    /// Ticket for refreshing `view` under the current navigation.
    pub async fn ticket(&self, view: View) -> Ticket {
        let state = self.inner.lock().await;
        Ticket {
            generation: state.generation,
            view,
        }
    }

    /// Whether a refresh started with `ticket` may still render.
    pub async fn is_current(&self, ticket: Ticket) -> bool {
        self.inner.lock().await.is_current(ticket)
    }

    /// Apply `update` if `ticket` is still current, returning whether it ran.
    pub async fn commit(&self, ticket: Ticket, update: impl FnOnce(&mut ControllerState)) -> bool {
        let mut state = self.inner.lock().await;
        if state.is_current(ticket) {
            update(&mut state);
            true
        } else {
            false
        }
    }

    /// Apply `update` unconditionally.
    pub async fn update<R>(&self, update: impl FnOnce(&mut ControllerState) -> R) -> R {
        update(&mut *self.inner.lock().await)
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> ControllerState {
        self.inner.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_starts_on_catalog() {
        let state = SharedState::new().snapshot().await;
        assert_eq!(state.active_view, View::Catalog);
        assert_eq!(state.generation(), 0);
        assert!(state.products.is_empty());
    }

    #[tokio::test]
    async fn test_navigation_invalidates_older_tickets() {
        let state = SharedState::new();
        let catalog = state.navigate(View::Catalog).await;
        assert!(state.is_current(catalog).await);

        let cart = state.navigate(View::Cart).await;
        assert!(!state.is_current(catalog).await);
        assert!(state.is_current(cart).await);
    }

    #[tokio::test]
    async fn test_ticket_for_inactive_view_is_stale() {
        let state = SharedState::new();
        state.navigate(View::Cart).await;
        let ticket = state.ticket(View::Catalog).await;
        assert!(!state.is_current(ticket).await);
        assert_eq!(ticket.view(), View::Catalog);
    }

    #[tokio::test]
    async fn test_commit_skips_stale_updates() {
        let state = SharedState::new();
        let stale = state.navigate(View::Catalog).await;
        state.navigate(View::Catalog).await;

        let applied = state
            .commit(stale, |s| s.current_order = None)
            .await;
        assert!(!applied);

        let fresh = state.ticket(View::Catalog).await;
        assert!(state.commit(fresh, |_| {}).await);
    }
}
