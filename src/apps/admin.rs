//! Admin application: gated layout with dashboard and users pages.

use crate::apps::shared::{error_fallback, health_status, not_found_view};
use crate::apps::AppDefinition;
use crate::query::QueryState;
use crate::routing::{RouteConfigError, RouteNode, RouteTree, RouteTreeBuilder, WILDCARD};
use crate::security::GatePolicy;
use crate::view::{Element, NavChrome, RenderFailure, View};

const NAV_LINKS: [(&str, &str); 2] = [("/dashboard", "Dashboard"), ("/users", "Users")];

pub fn definition() -> AppDefinition {
    AppDefinition::new("admin", GatePolicy::RequireSession, error_fallback(), build)
}

pub fn build() -> Result<RouteTree, RouteConfigError> {
    let mut builder = RouteTreeBuilder::new();
    let root = builder.root(RouteNode::new("/", layout()).with_fallback(error_fallback()))?;
    builder.add_children(
        root,
        [
            RouteNode::new("/dashboard", dashboard()),
            RouteNode::new("/users", users()),
            RouteNode::new(WILDCARD, not_found_view()),
        ],
    )?;
    builder.finalize()
}

fn nav(chrome: &NavChrome) -> Element {
    let items = NAV_LINKS.iter().map(|(href, label)| {
        let mut link = Element::tag("a").attr("href", *href);
        if chrome.is_active(href) {
            link = link.attr("aria-current", "page");
        }
        Element::tag("li").child(link.with_text(*label))
    });
    Element::tag("nav").child(Element::tag("ul").children(items))
}

fn layout() -> View {
    View::new(|cx| {
        let aside = Element::tag("aside")
            .child(Element::tag("h2").with_text("Admin"))
            .child(nav(cx.chrome()));
        let main = Element::tag("main").child(
            cx.take_outlet()
                .unwrap_or_else(|| Element::tag("p").with_text("Select a section.")),
        );
        Ok(Element::tag("div").attr("class", "admin-layout").child(aside).child(main))
    })
}

/// Unlike the web about page, a failed probe is raised to the boundary.
fn dashboard() -> View {
    View::new(|cx| {
        let body = match cx.query("/health") {
            QueryState::Loading => Element::tag("p").with_text("Loading..."),
            QueryState::Ready(value) => Element::tag("p").with_text(health_status(&value)?),
            QueryState::Error(e) => return Err(RenderFailure::from(e)),
        };
        Ok(Element::tag("section")
            .child(Element::tag("h1").with_text("Dashboard"))
            .child(body))
    })
}

fn users() -> View {
    View::new(|_| {
        Ok(Element::tag("section")
            .child(Element::tag("h1").with_text("Users"))
            .child(Element::tag("p").with_text("No users to show.")))
    })
}
