//! Session middleware configuration.
//!
//! Each browser gets a session cookie naming its client id; the controller
//! state for that id lives in [`AppState`](crate::state::AppState). The
//! session itself holds nothing else, so the in-memory store is enough.

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "vitrina_session";

/// Session expiry time in seconds (1 day of inactivity).
pub const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Session keys.
pub mod session_keys {
    /// Id of the browser's controller state.
    pub const CLIENT_ID: &str = "client_id";
}

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The browser's client id, assigned on its first request.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn client_id(session: &Session) -> Result<Uuid, tower_sessions::session::Error> {
    if let Some(id) = session.get::<Uuid>(session_keys::CLIENT_ID).await? {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    session.insert(session_keys::CLIENT_ID, id).await?;
    tracing::debug!(client_id = %id, "Assigned client id");
    Ok(id)
}
