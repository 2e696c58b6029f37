//! Integration tests for the Vitrina storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrina-integration-tests
//! ```
//!
//! The storefront router runs in-process against an in-memory backend; no
//! server or network is needed. Each [`TestContext`] is one browser with its
//! own session cookie; [`TestContext::new_browser`] opens another one on the
//! same storefront.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;
use vitrina_storefront::config::{BackendConfig, StorefrontConfig};
use vitrina_storefront::state::AppState;
use vitrina_storefront::surface::HX_TRIGGER;
use vitrina_storefront::testing::InMemoryStore;

/// A browser talking to a storefront over an in-memory backend.
pub struct TestContext {
    pub store: InMemoryStore,
    router: Router,
    /// Session cookie (`name=value`) set by the storefront
    cookie: Mutex<Option<String>>,
}

impl TestContext {
    /// Storefront over the demo store.
    ///
    /// # Panics
    ///
    /// Never: the backend URL is a constant.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        let store = InMemoryStore::demo();
        let config =
            StorefrontConfig::with_backend(BackendConfig::parse("http://store.test").unwrap());
        let router = vitrina_storefront::app(AppState::new(config, store.clone()));
        Self {
            store,
            router,
            cookie: Mutex::new(None),
        }
    }

    /// Another browser on the same storefront, with no cookie yet.
    #[must_use]
    pub fn new_browser(&self) -> Self {
        Self {
            store: self.store.clone(),
            router: self.router.clone(),
            cookie: Mutex::new(None),
        }
    }

    /// Session cookie the storefront gave this browser, if any.
    pub async fn cookie(&self) -> Option<String> {
        self.cookie.lock().await.clone()
    }

    /// Send a request to the storefront.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    #[allow(clippy::unwrap_used)]
    pub async fn send(&self, method: &str, uri: &str, form: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };
        if let Some(cookie) = self.cookie.lock().await.as_deref() {
            builder = builder.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            *self.cookie.lock().await = Some(pair.to_string());
        }
        let trigger = response
            .headers()
            .get(HX_TRIGGER)
            .map(|v| serde_json::from_str(v.to_str().unwrap()).unwrap());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
            trigger,
        }
    }

    /// `GET uri`.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, None).await
    }

    /// `POST uri` with no body.
    pub async fn post(&self, uri: &str) -> TestResponse {
        self.send("POST", uri, None).await
    }

    /// `POST uri` with a urlencoded form.
    pub async fn post_form(&self, uri: &str, form: &str) -> TestResponse {
        self.send("POST", uri, Some(form)).await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A storefront response, read in full.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
    /// Decoded `HX-Trigger` header.
    pub trigger: Option<Value>,
}

impl TestResponse {
    /// Text swapped into the element with DOM id `id`.
    #[must_use]
    pub fn swapped_text(&self, id: &str) -> Option<&str> {
        let open = format!(r#"<div id="{id}" hx-swap-oob="innerHTML">"#);
        let start = self.body.find(&open)? + open.len();
        let rest = self.body.get(start..)?;
        rest.find("</div>").and_then(|end| rest.get(..end))
    }

    /// Whether the response swaps the element with DOM id `id`.
    #[must_use]
    pub fn swaps(&self, id: &str) -> bool {
        self.body.contains(&format!(r#"<div id="{id}" hx-swap-oob="innerHTML">"#))
    }

    /// Visibility the response sets for the element with DOM id `id`.
    #[must_use]
    pub fn visibility(&self, id: &str) -> Option<bool> {
        self.trigger.as_ref()?["surface-visibility"]["changes"]
            .as_array()?
            .iter()
            .find(|change| change["id"] == id)
            .and_then(|change| change["visible"].as_bool())
    }

    /// Message of the named trigger event.
    #[must_use]
    pub fn event(&self, name: &str) -> Option<&str> {
        self.trigger.as_ref()?.get(name)?.as_str()
    }
}
