//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::FutureExt;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use spa_shell::config::ApiConfig;
use spa_shell::query::{Fetcher, QueryError, QueryFuture, QueryKey};
use spa_shell::security::StaticSession;
use spa_shell::{ApiServer, Host, ShellContext, Shutdown};

/// Start the API on an ephemeral port.
pub async fn start_api() -> (SocketAddr, Shutdown, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = ApiServer::new(ApiConfig::default());
    let signal = shutdown.clone();
    let handle = tokio::spawn(async move {
        server.run(listener, signal).await.unwrap();
    });
    (addr, shutdown, handle)
}

/// In-memory fetcher: counts calls, can hold responses until released,
/// and fails selected keys with a 503.
#[derive(Default)]
pub struct FakeFetcher {
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Responses wait until [`FakeFetcher::release`] is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    pub fn failing(self, key: &str) -> Self {
        self.failing.lock().unwrap().insert(key.to_string());
        self
    }

    /// Later requests for `key` succeed.
    pub fn recover(&self, key: &str) {
        self.failing.lock().unwrap().remove(key);
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1024);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fetcher for FakeFetcher {
    fn fetch(&self, key: &QueryKey) -> QueryFuture {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.clone();
        let fail = self.failing.lock().unwrap().contains(key.as_str());
        async move {
            if let Some(gate) = gate {
                let _permit = gate.acquire().await.unwrap();
            }
            if fail {
                Err(QueryError::Status {
                    status: 503,
                    message: "Service Unavailable".into(),
                })
            } else {
                Ok(serde_json::json!({ "status": "ok" }))
            }
        }
        .boxed()
    }
}

pub fn context(fetcher: Arc<FakeFetcher>, authorized: bool) -> ShellContext {
    ShellContext::with_fetcher(fetcher, Arc::new(StaticSession::new(authorized)))
}

/// A host with a `root` container.
pub fn host() -> Host {
    let host = Host::new();
    host.add_container("root");
    host
}
