//! Host-provided rendering targets.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

/// A rendering target. Holds the latest committed frame.
///
/// Readers load the frame without locking while the shell commits new ones.
#[derive(Debug)]
pub struct Container {
    id: String,
    frame: ArcSwap<String>,
    commits: AtomicU64,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            frame: ArcSwap::from_pointee(String::new()),
            commits: AtomicU64::new(0),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Latest committed HTML.
    pub fn frame(&self) -> Arc<String> {
        self.frame.load_full()
    }

    /// Replace the frame.
    pub fn commit(&self, html: String) {
        self.frame.store(Arc::new(html));
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of frames committed so far.
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }
}

/// Registry of containers the host page provides.
#[derive(Debug, Default)]
pub struct Host {
    containers: DashMap<String, Arc<Container>>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container, returning the existing one if the id is taken.
    pub fn add_container(&self, id: &str) -> Arc<Container> {
        self.containers
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Container::new(id)))
            .clone()
    }

    pub fn container(&self, id: &str) -> Option<Arc<Container>> {
        self.containers.get(id).map(|c| Arc::clone(&c))
    }

    pub fn remove_container(&self, id: &str) -> Option<Arc<Container>> {
        self.containers.remove(id).map(|(_, c)| c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_replaces_frame() {
        let container = Container::new("root");
        assert!(container.frame().is_empty());

        let before = container.frame();
        container.commit("<p>one</p>".into());
        container.commit("<p>two</p>".into());

        assert_eq!(container.frame().as_str(), "<p>two</p>");
        assert!(before.is_empty());
        assert_eq!(container.commits(), 2);
    }

    #[test]
    fn test_host_registry() {
        let host = Host::new();
        let a = host.add_container("root");
        let b = host.add_container("root");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(host.container("root").is_some());
        assert!(host.container("app").is_none());
        assert!(host.remove_container("root").is_some());
        assert!(host.container("root").is_none());
    }
}
