//! De-duplicating query cache.
//!
//! # Responsibilities
//! - Coalesce concurrent requests for one key into a single fetch
//! - Keep settled values (and errors) until invalidated
//! - Deliver settlements to subscribers whose epoch is still live
//!
//! # Design Decisions
//! - Slots live in a DashMap; the shared future is cloned out before any await,
//!   so no shard lock is held across a suspension point
//! - Settling a slot and draining its subscribers happen under the slot's
//!   entry guard, so a concurrent `subscribe` either sees the settled value or
//!   is drained; it is never missed
//! - Callbacks run after every guard is released
//! - Every new request gets its own driver task, so dropping a caller never
//!   strands the slot in flight

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};

use crate::observability::metrics;
use crate::query::{Fetcher, QueryError, QueryKey, QueryState};
use crate::routing::EpochToken;

type Settlement = Result<Arc<serde_json::Value>, QueryError>;
type SharedFetch = Shared<BoxFuture<'static, Settlement>>;
type Callback = Box<dyn FnOnce(&QueryState, EpochToken) + Send + Sync>;

enum Slot {
    InFlight(SharedFetch),
    Settled(Settlement),
}

struct Subscriber {
    id: u64,
    token: EpochToken,
    callback: Callback,
    pending: Arc<AtomicBool>,
}

struct CacheInner {
    fetcher: Arc<dyn Fetcher>,
    slots: DashMap<QueryKey, Slot>,
    subscribers: DashMap<QueryKey, Vec<Subscriber>>,
    next_subscriber: AtomicU64,
}

enum Lookup {
    Settled(Settlement),
    Pending { fetch: SharedFetch, driven: bool },
}

/// Shared async key/value cache. Cloning shares the same store.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                fetcher,
                slots: DashMap::new(),
                subscribers: DashMap::new(),
                next_subscriber: AtomicU64::new(1),
            }),
        }
    }

    /// Resolve `key`, joining an in-flight request if there is one.
    pub async fn resolve(&self, key: &QueryKey) -> Result<Arc<serde_json::Value>, QueryError> {
        match self.lookup(key) {
            Lookup::Settled(settlement) => settlement,
            Lookup::Pending { fetch, .. } => fetch.await,
        }
    }

    /// Non-blocking snapshot. The first request for a key starts a background
    /// fetch on the current tokio runtime.
    pub fn fetch(&self, key: &QueryKey) -> QueryState {
        match self.lookup(key) {
            Lookup::Settled(settlement) => to_state(&settlement),
            Lookup::Pending { driven: true, .. } => QueryState::Loading,
            Lookup::Pending { driven: false, .. } => {
                self.inner
                    .slots
                    .remove_if(key, |_, slot| matches!(slot, Slot::InFlight(_)));
                QueryState::Error(QueryError::Unavailable(
                    "no async runtime to drive the fetch".into(),
                ))
            }
        }
    }

    /// Run `callback` once `key` settles, provided `token` is still live then.
    ///
    /// If the key is already settled the callback runs immediately.
    pub fn subscribe<F>(&self, key: QueryKey, token: EpochToken, callback: F) -> Subscription
    where
        F: FnOnce(&QueryState, EpochToken) + Send + Sync + 'static,
    {
        let pending = Arc::new(AtomicBool::new(true));
        let guard = self.inner.slots.get(&key);
        let settled = match guard.as_deref() {
            Some(Slot::InFlight(_)) => None,
            Some(Slot::Settled(settlement)) => Some(to_state(settlement)),
            None => Some(QueryState::Error(QueryError::Unavailable(format!(
                "no request started for '{}'",
                key
            )))),
        };

        if let Some(state) = settled {
            drop(guard);
            if token.is_live() {
                callback(&state, token);
            }
            pending.store(false, Ordering::Release);
            return Subscription {
                key,
                id: 0,
                pending,
                inner: Weak::new(),
            };
        }

        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .entry(key.clone())
            .or_default()
            .push(Subscriber {
                id,
                token,
                callback: Box::new(callback),
                pending: Arc::clone(&pending),
            });
        drop(guard);

        Subscription {
            key,
            id,
            pending,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Drop a settled entry so the next request refetches.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        self.inner
            .slots
            .remove_if(key, |_, slot| matches!(slot, Slot::Settled(_)))
            .is_some()
    }

    /// Current state without starting a fetch.
    pub fn peek(&self, key: &QueryKey) -> Option<QueryState> {
        self.inner.slots.get(key).map(|slot| match &*slot {
            Slot::InFlight(_) => QueryState::Loading,
            Slot::Settled(settlement) => to_state(settlement),
        })
    }

    /// Drop every settled entry, errors included. In-flight requests keep
    /// running and still settle into the cache.
    pub fn clear(&self) -> usize {
        let before = self.inner.slots.len();
        self.inner.slots.retain(|_, slot| matches!(slot, Slot::InFlight(_)));
        let cleared = before.saturating_sub(self.inner.slots.len());
        tracing::debug!(cleared, "Query cache cleared");
        cleared
    }

    fn lookup(&self, key: &QueryKey) -> Lookup {
        let fetch = match self.inner.slots.entry(key.clone()) {
            Entry::Occupied(entry) => {
                return match entry.get() {
                    Slot::Settled(settlement) => {
                        metrics::record_query("hit");
                        Lookup::Settled(settlement.clone())
                    }
                    Slot::InFlight(fetch) => {
                        tracing::trace!(key = %key, "Joined in-flight query");
                        metrics::record_query("coalesced");
                        Lookup::Pending {
                            fetch: fetch.clone(),
                            driven: true,
                        }
                    }
                };
            }
            Entry::Vacant(entry) => {
                tracing::debug!(key = %key, "Starting query");
                metrics::record_query("miss");
                let fetch = start(Arc::clone(&self.inner), key.clone());
                entry.insert(Slot::InFlight(fetch.clone()));
                fetch
            }
        };

        // The request runs to completion even if every caller goes away.
        let driven = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(fetch.clone());
                true
            }
            Err(_) => false,
        };
        Lookup::Pending { fetch, driven }
    }
}

fn start(inner: Arc<CacheInner>, key: QueryKey) -> SharedFetch {
    let request = inner.fetcher.fetch(&key);
    async move {
        let settlement = request.await.map(Arc::new);
        inner.settle(&key, &settlement);
        settlement
    }
    .boxed()
    .shared()
}

impl CacheInner {
    fn settle(&self, key: &QueryKey, settlement: &Settlement) {
        if let Err(e) = settlement {
            tracing::warn!(key = %key, error = %e, "Query failed");
        }

        let drained = {
            let mut slot = self.slots.entry(key.clone()).or_insert(Slot::Settled(settlement.clone()));
            *slot = Slot::Settled(settlement.clone());
            self.subscribers.remove(key).map(|(_, subs)| subs).unwrap_or_default()
        };

        let state = to_state(settlement);
        for subscriber in drained {
            if subscriber.token.is_live() {
                (subscriber.callback)(&state, subscriber.token);
            } else {
                tracing::debug!(
                    key = %key,
                    epoch = subscriber.token.value(),
                    "Discarded result for unmounted subtree"
                );
                metrics::record_query("discarded");
            }
            subscriber.pending.store(false, Ordering::Release);
        }
    }
}

fn to_state(settlement: &Settlement) -> QueryState {
    match settlement {
        Ok(value) => QueryState::Ready(Arc::clone(value)),
        Err(e) => QueryState::Error(e.clone()),
    }
}

/// Handle to a pending delivery. Dropping it cancels the delivery.
pub struct Subscription {
    key: QueryKey,
    id: u64,
    pending: Arc<AtomicBool>,
    inner: Weak<CacheInner>,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// True until the subscription is delivered, discarded, or cancelled.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.is_pending() {
            return;
        }
        self.pending.store(false, Ordering::Release);
        if let Some(inner) = self.inner.upgrade() {
            if let Some(mut subs) = inner.subscribers.get_mut(&self.key) {
                subs.retain(|s| s.id != self.id);
            }
        }
    }
}
