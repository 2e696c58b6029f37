//! Surface backed by an HTMX response.
//!
//! The browser keeps the page; each request runs one controller operation
//! against a fresh [`PageSurface`] that records what the operation did. The
//! recording becomes the response:
//!
//! - replaced regions and text slots are sent as out-of-band swaps
//!   (`hx-swap-oob="innerHTML"`), one per element, last write wins
//! - visibility changes, alerts, notifications and form resets are sent as
//!   `HX-Trigger` events handled by the shell's inline script

use std::fmt::Write as _;

use askama::Template;
use axum::http::HeaderValue;
use axum::response::{Html, IntoResponse, Response};
use serde_json::{Map, Value, json};

use super::{Element, Fragment, Surface, SurfaceError};
use crate::error::AppError;

/// Header carrying client-side events.
pub const HX_TRIGGER: &str = "HX-Trigger";

/// Event names understood by the shell script.
pub mod events {
    pub const VISIBILITY: &str = "surface-visibility";
    pub const ALERT: &str = "store-alert";
    pub const NOTIFY: &str = "store-notify";
    pub const RESET_FORM: &str = "reset-form";
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Swap {
    id: &'static str,
    content: String,
    is_text: bool,
}

/// Out-of-band swap list (HTMX).
#[derive(Template)]
#[template(path = "partials/oob_swaps.html")]
struct OobSwapsTemplate<'a> {
    swaps: &'a [Swap],
}

/// Records controller operations for one HTMX response.
///
/// The browser's page is the rendered `shell.html`, which carries every
/// [`Element`], so no operation reports [`SurfaceError::MissingElement`].
#[derive(Debug, Default)]
pub struct PageSurface {
    swaps: Vec<Swap>,
    visibility: Vec<(&'static str, bool)>,
    alerts: Vec<String>,
    notices: Vec<String>,
    form_resets: Vec<&'static str>,
}

impl PageSurface {
    /// Create an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the operation touched nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty()
            && self.visibility.is_empty()
            && self.alerts.is_empty()
            && self.notices.is_empty()
            && self.form_resets.is_empty()
    }

    fn push_swap(&mut self, swap: Swap) {
        self.swaps.retain(|s| s.id != swap.id);
        self.swaps.push(swap);
    }

    /// Render the out-of-band swaps.
    ///
    /// # Errors
    ///
    /// Returns an error if the swap template fails to render.
    pub fn render_body(&self) -> askama::Result<String> {
        OobSwapsTemplate {
            swaps: &self.swaps,
        }
        .render()
    }

    /// The `HX-Trigger` payload, if any event was recorded.
    #[must_use]
    pub fn trigger_payload(&self) -> Option<Value> {
        let mut payload = Map::new();

        if !self.visibility.is_empty() {
            let changes: Vec<Value> = self
                .visibility
                .iter()
                .map(|(id, visible)| json!({ "id": id, "visible": visible }))
                .collect();
            payload.insert(events::VISIBILITY.to_string(), json!({ "changes": changes }));
        }
        if !self.alerts.is_empty() {
            payload.insert(events::ALERT.to_string(), json!(self.alerts.join("\n")));
        }
        if let Some(notice) = self.notices.last() {
            payload.insert(events::NOTIFY.to_string(), json!(notice));
        }
        if let Some(form) = self.form_resets.last() {
            payload.insert(events::RESET_FORM.to_string(), json!(form));
        }

        (!payload.is_empty()).then_some(Value::Object(payload))
    }
}

impl Surface for PageSurface {
    fn set_visible(&mut self, element: Element, visible: bool) -> Result<(), SurfaceError> {
        let id = element.dom_id();
        self.visibility.retain(|(existing, _)| *existing != id);
        self.visibility.push((id, visible));
        Ok(())
    }

    fn replace(&mut self, element: Element, fragment: Fragment) -> Result<(), SurfaceError> {
        // Bindings are already in the markup as hx-post attributes
        self.push_swap(Swap {
            id: element.dom_id(),
            content: fragment.html,
            is_text: false,
        });
        Ok(())
    }

    fn set_text(&mut self, element: Element, text: &str) -> Result<(), SurfaceError> {
        self.push_swap(Swap {
            id: element.dom_id(),
            content: text.to_string(),
            is_text: true,
        });
        Ok(())
    }

    fn reset_form(&mut self, element: Element) -> Result<(), SurfaceError> {
        self.form_resets.push(element.dom_id());
        Ok(())
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

impl IntoResponse for PageSurface {
    fn into_response(self) -> Response {
        let body = match self.render_body() {
            Ok(body) => body,
            Err(e) => return AppError::from(e).into_response(),
        };

        let mut response = Html(body).into_response();
        if let Some(payload) = self.trigger_payload() {
            match HeaderValue::from_str(&ascii_json(&payload)) {
                Ok(value) => {
                    response.headers_mut().insert(HX_TRIGGER, value);
                }
                Err(e) => tracing::error!(error = %e, "Could not encode HX-Trigger header"),
            }
        }
        response
    }
}

/// Serialize JSON with every non-ASCII character escaped, as header values
/// must be visible ASCII.
fn ascii_json(value: &Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(out, "\\u{unit:04x}");
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use vitrina_core::View;

    #[test]
    fn test_empty_surface_has_no_trigger() {
        let surface = PageSurface::new();
        assert!(surface.is_empty());
        assert!(surface.trigger_payload().is_none());
        assert_eq!(surface.render_body().unwrap().trim(), "");
    }

    #[test]
    fn test_swaps_escape_text_but_not_fragments() {
        let mut surface = PageSurface::new();
        surface
            .replace(Element::ProductGrid, Fragment::new("<article>ok</article>"))
            .unwrap();
        surface.set_text(Element::OrderEmail, "<b>a@b.cl</b>").unwrap();

        let body = surface.render_body().unwrap();
        assert!(body.contains(r#"<div id="product-grid" hx-swap-oob="innerHTML"><article>ok</article></div>"#));
        assert!(body.contains("&lt;b&gt;a@b.cl&lt;/b&gt;"));
    }

    #[test]
    fn test_last_write_wins_per_element() {
        let mut surface = PageSurface::new();
        surface.set_text(Element::CartBadge, "1").unwrap();
        surface.set_text(Element::CartBadge, "2").unwrap();

        let body = surface.render_body().unwrap();
        assert_eq!(body.matches(r#"id="cart-badge""#).count(), 1);
        assert!(body.contains(">2</div>"));
    }

    #[test]
    fn test_visibility_and_feedback_events() {
        let mut surface = PageSurface::new();
        surface.set_visible(Element::View(View::Catalog), false).unwrap();
        surface.set_visible(Element::View(View::Cart), true).unwrap();
        surface.set_visible(Element::View(View::Catalog), true).unwrap();
        surface.notify("¡Producto agregado al carrito!");
        surface.alert("No pudimos cargar el carrito");
        surface.reset_form(Element::CheckoutForm).unwrap();

        let payload = surface.trigger_payload().unwrap();
        assert_eq!(
            payload[events::VISIBILITY]["changes"],
            json!([
                {"id": "view-cart", "visible": true},
                {"id": "view-catalog", "visible": true}
            ])
        );
        assert_eq!(payload[events::NOTIFY], "¡Producto agregado al carrito!");
        assert_eq!(payload[events::ALERT], "No pudimos cargar el carrito");
        assert_eq!(payload[events::RESET_FORM], "checkout-form");
    }

    #[test]
    fn test_response_header_is_ascii_json() {
        let mut surface = PageSurface::new();
        surface.notify("¡Listo! 🛒");

        let response = surface.into_response();
        let header = response.headers().get(HX_TRIGGER).unwrap().to_str().unwrap();
        let decoded: Value = serde_json::from_str(header).unwrap();
        assert_eq!(decoded[events::NOTIFY], "¡Listo! 🛒");
    }
}
