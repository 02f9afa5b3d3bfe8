//! Per-render context handed to views.

use std::cell::RefCell;

use tokio::sync::mpsc;

use crate::query::{QueryCache, QueryError, QueryKey, QueryState, Subscription};
use crate::routing::{EpochToken, Location};
use crate::view::Element;

/// Location-dependent chrome, updated from `LocationChanged` notifications.
#[derive(Debug, Clone, Default)]
pub struct NavChrome {
    active: Option<Location>,
}

impl NavChrome {
    pub fn set_active(&mut self, location: Location) {
        self.active = Some(location);
    }

    pub fn active(&self) -> Option<&Location> {
        self.active.as_ref()
    }

    /// Whether `href` names the active location (trailing slashes ignored).
    pub fn is_active(&self, href: &str) -> bool {
        self.active
            .as_ref()
            .is_some_and(|loc| loc.path().trim_end_matches('/') == href.trim_end_matches('/'))
    }
}

/// Data access for one render pass.
///
/// Loading queries register a subscription that requests a redraw, tagged with
/// the pass's epoch token, once the value arrives. Dropping the scope's
/// subscriptions cancels those requests.
pub struct DataScope {
    cache: QueryCache,
    token: EpochToken,
    redraw: mpsc::UnboundedSender<EpochToken>,
    pending: RefCell<Vec<Subscription>>,
}

impl DataScope {
    pub fn new(cache: QueryCache, token: EpochToken, redraw: mpsc::UnboundedSender<EpochToken>) -> Self {
        Self {
            cache,
            token,
            redraw,
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn token(&self) -> &EpochToken {
        &self.token
    }

    pub fn query(&self, key: QueryKey) -> QueryState {
        let state = self.cache.fetch(&key);
        if state.is_loading() {
            let redraw = self.redraw.clone();
            let subscription = self.cache.subscribe(key, self.token.clone(), move |_, token| {
                let _ = redraw.send(token);
            });
            self.pending.borrow_mut().push(subscription);
        }
        state
    }

    /// Subscriptions registered during the pass.
    pub fn into_subscriptions(self) -> Vec<Subscription> {
        self.pending.into_inner()
    }
}

/// Everything a view may read while rendering.
pub struct RenderContext<'a> {
    location: &'a Location,
    chrome: &'a NavChrome,
    outlet: Option<Element>,
    data: Option<&'a DataScope>,
}

impl<'a> RenderContext<'a> {
    pub fn new(location: &'a Location, chrome: &'a NavChrome) -> Self {
        Self {
            location,
            chrome,
            outlet: None,
            data: None,
        }
    }

    pub fn with_outlet(mut self, outlet: Option<Element>) -> Self {
        self.outlet = outlet;
        self
    }

    pub fn with_data(mut self, data: &'a DataScope) -> Self {
        self.data = Some(data);
        self
    }

    pub fn location(&self) -> &Location {
        self.location
    }

    pub fn chrome(&self) -> &NavChrome {
        self.chrome
    }

    /// Take the rendered child, if this node is a layout for a deeper match.
    pub fn take_outlet(&mut self) -> Option<Element> {
        self.outlet.take()
    }

    /// Read a query through the shared cache.
    pub fn query(&mut self, key: impl Into<QueryKey>) -> QueryState {
        match self.data {
            Some(data) => data.query(key.into()),
            None => QueryState::Error(QueryError::Unavailable("no data scope in this render".into())),
        }
    }
}
