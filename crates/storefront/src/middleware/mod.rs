//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions), added by the binary
//! 2. `TraceLayer` (request span from [`request_span`])
//! 3. Request ID (add unique ID to each request)
//! 4. Session (cookie naming the browser's client id)

pub mod request_id;
pub mod session;

pub use request_id::{request_id_middleware, request_span};
pub use session::{SESSION_COOKIE_NAME, client_id, create_session_layer};
