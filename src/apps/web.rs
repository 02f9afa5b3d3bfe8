//! Public web application: home, about, not-found.

use crate::apps::shared::{error_fallback, health_status, not_found_view};
use crate::apps::AppDefinition;
use crate::query::QueryState;
use crate::routing::{RouteConfigError, RouteNode, RouteTree, RouteTreeBuilder, WILDCARD};
use crate::security::GatePolicy;
use crate::view::{Element, View};

pub fn definition() -> AppDefinition {
    AppDefinition::new("web", GatePolicy::Public, error_fallback(), build)
}

pub fn build() -> Result<RouteTree, RouteConfigError> {
    let mut builder = RouteTreeBuilder::new();
    let root = builder.root(RouteNode::new("/", home()).with_fallback(error_fallback()))?;
    builder.add_children(
        root,
        [
            RouteNode::new("/about", about()),
            RouteNode::new(WILDCARD, not_found_view()),
        ],
    )?;
    builder.finalize()
}

fn home() -> View {
    View::new(|cx| {
        let content = cx
            .take_outlet()
            .unwrap_or_else(|| Element::tag("h1").with_text("Welcome Home"));
        Ok(Element::tag("main").child(content))
    })
}

/// Reports backend health. A failed probe is shown, not raised.
fn about() -> View {
    View::new(|cx| {
        let status = match cx.query("/health") {
            QueryState::Loading => "Checking API status...".to_string(),
            QueryState::Ready(value) => health_status(&value)?,
            QueryState::Error(e) => format!("API unavailable: {}", e),
        };
        Ok(Element::tag("section")
            .child(Element::tag("h1").with_text("About"))
            .child(Element::tag("p").with_text(status)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{resolve, Location};
    use crate::view::{NavChrome, RenderContext};

    #[test]
    fn test_tree_shape() {
        let tree = build().unwrap();
        let paths: Vec<_> = tree
            .walk()
            .into_iter()
            .map(|(depth, id)| (depth, tree.node(id).unwrap().path().to_string()))
            .collect();
        assert_eq!(
            paths,
            vec![(0, "/".to_string()), (1, "/about".to_string()), (1, "*".to_string())]
        );
    }

    #[test]
    fn test_matching() {
        let tree = build().unwrap();
        let path_of = |loc: &str| {
            let id = resolve(&tree, &Location::from(loc)).node().unwrap();
            tree.node(id).unwrap().path().to_string()
        };
        assert_eq!(path_of("/"), "/");
        assert_eq!(path_of("/about"), "/about");
        assert_eq!(path_of("/missing"), "*");
    }

    #[test]
    fn test_home_without_outlet() {
        let location = Location::from("/");
        let chrome = NavChrome::default();
        let mut cx = RenderContext::new(&location, &chrome);
        let html = home().render(&mut cx).unwrap().to_html();
        assert_eq!(html, "<main><h1>Welcome Home</h1></main>");
    }

    #[test]
    fn test_about_without_data_layer_still_renders() {
        let location = Location::from("/about");
        let chrome = NavChrome::default();
        let mut cx = RenderContext::new(&location, &chrome);
        let text = about().render(&mut cx).unwrap().text_content();
        assert!(text.contains("API unavailable"));
    }
}
