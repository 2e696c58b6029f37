//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::{StoreApiClient, StoreBackend};
use crate::config::StorefrontConfig;
use crate::controller::{SharedState, ViewController};
use crate::error::Result;
use crate::middleware::session::{SESSION_EXPIRY_SECONDS, client_id};
use crate::surface::Surface;

/// Most browsers whose controller state is kept at once.
const MAX_CLIENTS: u64 = 10_000;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the store backend and each browser's controller state.
pub struct AppState<B = StoreApiClient> {
    inner: Arc<AppStateInner<B>>,
}

struct AppStateInner<B> {
    config: StorefrontConfig,
    backend: B,
    /// Controller state per client id, dropped after a day of inactivity
    clients: Cache<Uuid, SharedState>,
}

// Manual impl: `B` itself need not be `Clone` for the `Arc` to be.
impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl AppState<StoreApiClient> {
    /// Create state talking to the configured REST backend.
    #[must_use]
    pub fn from_config(config: StorefrontConfig) -> Self {
        let backend = StoreApiClient::new(&config.backend);
        Self::new(config, backend)
    }
}

impl<B: StoreBackend> AppState<B> {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, backend: B) -> Self {
        let clients = Cache::builder()
            .max_capacity(MAX_CLIENTS)
            .time_to_idle(Duration::from_secs(SESSION_EXPIRY_SECONDS.unsigned_abs()))
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                clients,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the store backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    /// Controller state of one client, created on first use.
    pub async fn client_state(&self, client: Uuid) -> SharedState {
        self.inner
            .clients
            .get_with(client, async { SharedState::new() })
            .await
    }

    /// A controller driving `surface` for the browser owning `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read or written.
    pub async fn controller<S: Surface>(
        &self,
        session: &Session,
        surface: S,
    ) -> Result<ViewController<B, S>> {
        let client = client_id(session).await?;
        Ok(ViewController::new(
            self.inner.backend.clone(),
            surface,
            self.client_state(client).await,
        ))
    }
}
