//! Rendered output tree.

use std::fmt::Write;

/// A rendered element. Serializes to escaped HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Text(String),
    Tag {
        name: &'static str,
        attrs: Vec<(&'static str, String)>,
        children: Vec<Element>,
    },
    Fragment(Vec<Element>),
}

impl Element {
    pub fn tag(name: &'static str) -> Self {
        Element::Tag {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Element::Text(text.into())
    }

    /// An element that renders nothing.
    pub fn empty() -> Self {
        Element::Fragment(Vec::new())
    }

    /// Add an attribute. No-op on text and fragments.
    pub fn attr(mut self, key: &'static str, value: impl Into<String>) -> Self {
        if let Element::Tag { attrs, .. } = &mut self {
            attrs.push((key, value.into()));
        }
        self
    }

    /// Append a child. On text the child is ignored.
    pub fn child(mut self, child: Element) -> Self {
        match &mut self {
            Element::Tag { children, .. } | Element::Fragment(children) => children.push(child),
            Element::Text(_) => {}
        }
        self
    }

    pub fn children(self, items: impl IntoIterator<Item = Element>) -> Self {
        items.into_iter().fold(self, Element::child)
    }

    /// Shorthand for appending a text child.
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.child(Element::text(text))
    }

    /// Concatenated text content, depth first.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Element::Text(t) => out.push_str(t),
            Element::Tag { children, .. } | Element::Fragment(children) => {
                children.iter().for_each(|c| c.collect_text(out))
            }
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Element::Text(t) => escape_into(t, out),
            Element::Fragment(children) => children.iter().for_each(|c| c.write_html(out)),
            Element::Tag {
                name,
                attrs,
                children,
            } => {
                let _ = write!(out, "<{}", name);
                for (key, value) in attrs {
                    let _ = write!(out, " {}=\"", key);
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                children.iter().for_each(|c| c.write_html(out));
                let _ = write!(out, "</{}>", name);
            }
        }
    }
}

fn escape_into(raw: &str, out: &mut String) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
