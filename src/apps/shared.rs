//! Views shared by both applications.

use crate::resilience::ResetAction;
use crate::view::{Element, FallbackView, RenderFailure, View};

/// Panel shown in place of a failed subtree. The failure text is shown raw.
pub fn error_panel(failure: &RenderFailure, reset: &ResetAction) -> Element {
    Element::tag("div")
        .attr("role", "alert")
        .attr("aria-live", "assertive")
        .child(Element::tag("h1").with_text("Something went wrong."))
        .child(Element::tag("pre").with_text(failure.message()))
        .child(reset.control("Reload"))
}

pub fn error_fallback() -> FallbackView {
    FallbackView::new(|failure, reset| Ok(error_panel(failure, reset)))
}

pub fn not_found_view() -> View {
    View::new(|_| {
        Ok(Element::tag("div")
            .attr("role", "alert")
            .attr("aria-live", "assertive")
            .child(Element::tag("h1").with_text("404 - Not Found"))
            .child(Element::tag("p").with_text("The page you are looking for does not exist."))
            .child(Element::tag("a").attr("href", "/").with_text("Go Home")))
    })
}

/// Text for the `/health` probe result.
pub(crate) fn health_status(value: &serde_json::Value) -> Result<String, RenderFailure> {
    value
        .get("status")
        .and_then(|s| s.as_str())
        .map(|s| format!("API status: {}", s))
        .ok_or_else(|| RenderFailure::new(format!("unexpected /health response: {}", value)))
}
