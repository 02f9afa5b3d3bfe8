//! Composition root.
//!
//! # Responsibilities
//! - Mount an application into a host container
//! - Wire AccessGate → RecoveryBoundary → Router → RouteTree for every render
//! - Re-render on navigation and when awaited data arrives
//! - Turn a boundary reset into a full teardown and remount
//!
//! # Design Decisions
//! - Each render pass gets a fresh epoch token; subscriptions from the
//!   previous pass are dropped (cancelled) when the next pass commits
//! - Redraw requests carrying a dead token are discarded
//! - Recovery state lives in the mounted app, so a reload starts clean
//! - A reload also empties the query cache and resolves the session again

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::TryRecvError as BroadcastTryRecvError};
use tokio::sync::mpsc::{self, error::TryRecvError};
use uuid::Uuid;

use crate::apps::AppDefinition;
use crate::lifecycle::mount::{Container, Host};
use crate::lifecycle::startup::{ShellContext, ShellError};
use crate::query::Subscription;
use crate::resilience::{BoundaryId, RecoveryBoundary, RecoveryState, ReloadSignal};
use crate::routing::{EpochToken, Location, LocationChanged, Navigation, NodeId, RouteTree, Router};
use crate::security::{AccessGate, AuthzContext};
use crate::view::{DataScope, Element, NavChrome, RenderContext, RenderFailure};

/// One mounted instance of an application. Dropped wholesale on reload.
struct MountedApp {
    mount_id: Uuid,
    router: Router,
    shell_boundary: RecoveryBoundary,
    node_boundaries: HashMap<NodeId, RecoveryBoundary>,
    chrome: NavChrome,
    events: broadcast::Receiver<LocationChanged>,
    subscriptions: Vec<Subscription>,
}

impl MountedApp {
    fn build(app: &AppDefinition, reload: &ReloadSignal) -> Result<Self, ShellError> {
        let tree = Arc::new(app.build_tree()?);
        let node_boundaries = tree
            .walk()
            .into_iter()
            .filter_map(|(_, id)| {
                let fallback = tree.node(id)?.fallback()?.clone();
                Some((id, RecoveryBoundary::new(BoundaryId::Node(id), fallback, reload.clone())))
            })
            .collect();

        let router = Router::new(tree);
        let events = router.subscribe();
        Ok(Self {
            mount_id: Uuid::new_v4(),
            shell_boundary: RecoveryBoundary::new(BoundaryId::Shell, app.fallback().clone(), reload.clone()),
            router,
            node_boundaries,
            chrome: NavChrome::default(),
            events,
            subscriptions: Vec::new(),
        })
    }

    fn boundary(&self, id: BoundaryId) -> Option<&RecoveryBoundary> {
        match id {
            BoundaryId::Shell => Some(&self.shell_boundary),
            BoundaryId::Node(node) => self.node_boundaries.get(&node),
        }
    }

    /// Apply queued `LocationChanged` notifications to the chrome.
    fn drain_chrome(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.chrome.set_active(event.to),
                Err(BroadcastTryRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Chrome skipped stale location events");
                }
                Err(BroadcastTryRecvError::Empty) | Err(BroadcastTryRecvError::Closed) => break,
            }
        }
    }

    fn has_pending(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_pending)
    }

    /// Render `chain` (root first), nesting each rendered child as its parent's outlet.
    fn render_chain(
        &self,
        tree: &RouteTree,
        chain: &[NodeId],
        location: &Location,
        scope: &DataScope,
    ) -> Result<Element, RenderFailure> {
        let Some((&id, rest)) = chain.split_first() else {
            return Ok(Element::empty());
        };
        let node = tree
            .node(id)
            .ok_or_else(|| RenderFailure::new(format!("{} is not part of the mounted tree", id)))?;

        let render = || -> Result<Element, RenderFailure> {
            let outlet = if rest.is_empty() {
                None
            } else {
                Some(self.render_chain(tree, rest, location, scope)?)
            };
            let mut cx = RenderContext::new(location, &self.chrome)
                .with_outlet(outlet)
                .with_data(scope);
            node.view().render(&mut cx)
        };

        match self.node_boundaries.get(&id) {
            Some(boundary) => boundary.guard(render),
            None => render(),
        }
    }
}

/// A mounted application bound to its container.
pub struct Shell {
    app: AppDefinition,
    ctx: ShellContext,
    container: Arc<Container>,
    gate: AccessGate,
    authz: AuthzContext,
    reload: ReloadSignal,
    redraw_tx: mpsc::UnboundedSender<EpochToken>,
    redraw_rx: mpsc::UnboundedReceiver<EpochToken>,
    mounted: MountedApp,
    reloads: u64,
}

impl Shell {
    /// Mount `app` into the host container `container_id` and render `initial`.
    ///
    /// Fails before anything is committed if the container is missing, the
    /// tree is invalid, or `initial` matches no route.
    pub fn mount(
        host: &Host,
        container_id: &str,
        app: AppDefinition,
        ctx: &ShellContext,
        initial: impl Into<Location>,
    ) -> Result<Self, ShellError> {
        let container = host
            .container(container_id)
            .ok_or_else(|| ShellError::MissingContainer(container_id.to_string()))?;

        let reload = ReloadSignal::new();
        let mut mounted = MountedApp::build(&app, &reload)?;
        mounted.router.navigate(initial)?;
        let authz = ctx.session().resolve();
        let (redraw_tx, redraw_rx) = mpsc::unbounded_channel();

        tracing::info!(
            app = %app.name(),
            container = %container_id,
            mount_id = %mounted.mount_id,
            authorized = authz.is_authorized(),
            "Application mounted"
        );

        let mut shell = Self {
            gate: AccessGate::new(app.policy()),
            app,
            ctx: ctx.clone(),
            container,
            authz,
            reload,
            redraw_tx,
            redraw_rx,
            mounted,
            reloads: 0,
        };
        shell.render()?;
        Ok(shell)
    }

    /// Navigate and re-render. Navigating to the current location does nothing.
    pub fn navigate(&mut self, location: impl Into<Location>) -> Result<Navigation, ShellError> {
        let navigation = self.mounted.router.navigate(location)?;
        if let Navigation::Changed(_) = navigation {
            self.render()?;
        }
        Ok(navigation)
    }

    /// Invoke the reset control of `boundary`.
    ///
    /// Returns false if the boundary does not exist or is not errored.
    /// Otherwise the whole application is reloaded at the current location.
    pub fn reset(&mut self, boundary: BoundaryId) -> Result<bool, ShellError> {
        let reset = self.mounted.boundary(boundary).is_some_and(RecoveryBoundary::reset);
        if reset && self.reload.take() {
            self.reload()?;
        }
        Ok(reset)
    }

    /// Tear the application down and mount a fresh instance at the same location.
    ///
    /// Settled query results are dropped, so the new instance refetches.
    pub fn reload(&mut self) -> Result<(), ShellError> {
        let location = self
            .mounted
            .router
            .current()
            .cloned()
            .unwrap_or_else(|| Location::from("/"));

        // Outstanding work from the old instance must never land.
        self.mounted.router.retire();
        let mut mounted = MountedApp::build(&self.app, &self.reload)?;
        mounted.router.navigate(location.clone())?;
        let previous = std::mem::replace(&mut self.mounted, mounted);
        self.reloads += 1;

        // Nothing the failed instance read or resolved is reused.
        let cleared = self.ctx.cache().clear();
        self.authz = self.ctx.session().resolve();

        tracing::info!(
            app = %self.app.name(),
            previous_mount_id = %previous.mount_id,
            mount_id = %self.mounted.mount_id,
            location = %location,
            cleared,
            authorized = self.authz.is_authorized(),
            "Application reloaded"
        );
        drop(previous);
        self.render()
    }

    /// Re-render as awaited data arrives, until no delivery is pending.
    ///
    /// Returns the number of redraws performed.
    pub async fn settle(&mut self) -> Result<usize, ShellError> {
        let mut redraws = 0;
        loop {
            // Sample before polling: a delivery sends its redraw before it
            // stops being pending.
            let pending = self.mounted.has_pending();
            let token = match self.redraw_rx.try_recv() {
                Ok(token) => token,
                Err(TryRecvError::Empty) if pending => match self.redraw_rx.recv().await {
                    Some(token) => token,
                    None => return Ok(redraws),
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return Ok(redraws),
            };

            if !token.is_live() {
                tracing::debug!(epoch = token.value(), "Discarded redraw for a superseded render");
                continue;
            }
            self.render()?;
            redraws += 1;
        }
    }

    pub fn app(&self) -> &AppDefinition {
        &self.app
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// Latest committed HTML.
    pub fn html(&self) -> Arc<String> {
        self.container.frame()
    }

    pub fn current(&self) -> Option<&Location> {
        self.mounted.router.current()
    }

    pub fn mount_id(&self) -> Uuid {
        self.mounted.mount_id
    }

    /// Number of full reloads since mount.
    pub fn reloads(&self) -> u64 {
        self.reloads
    }

    pub fn chrome(&self) -> &NavChrome {
        &self.mounted.chrome
    }

    pub fn boundary_state(&self, id: BoundaryId) -> Option<RecoveryState> {
        self.mounted.boundary(id).map(RecoveryBoundary::state)
    }

    /// Node boundary ids in tree order.
    pub fn boundaries(&self) -> Vec<BoundaryId> {
        let tree = self.mounted.router.tree();
        std::iter::once(BoundaryId::Shell)
            .chain(
                tree.walk()
                    .into_iter()
                    .map(|(_, id)| id)
                    .filter(|id| self.mounted.node_boundaries.contains_key(id))
                    .map(BoundaryId::Node),
            )
            .collect()
    }

    /// One render pass, committed to the container.
    fn render(&mut self) -> Result<(), ShellError> {
        self.mounted.drain_chrome();

        let mounted = &self.mounted;
        let Some(location) = mounted.router.current().cloned() else {
            return Ok(());
        };
        let tree = Arc::clone(mounted.router.tree());
        let chain = mounted.router.chain();
        let scope = DataScope::new(self.ctx.cache().clone(), mounted.router.token(), self.redraw_tx.clone());

        let authorized = self.gate.decide(&self.authz);
        let rendered = self.gate.evaluate(authorized, || {
            mounted
                .shell_boundary
                .guard(|| mounted.render_chain(&tree, &chain, &location, &scope))
        });

        // Replacing the previous pass's subscriptions cancels them.
        self.mounted.subscriptions = scope.into_subscriptions();

        match rendered {
            Ok(element) => {
                self.container.commit(element.to_html());
                tracing::trace!(
                    mount_id = %self.mounted.mount_id,
                    location = %location,
                    pending = self.mounted.subscriptions.len(),
                    "Frame committed"
                );
                Ok(())
            }
            Err(failure) => {
                tracing::error!(
                    mount_id = %self.mounted.mount_id,
                    error = %failure,
                    "Render failure escaped the shell boundary"
                );
                Err(ShellError::Unrecovered(failure))
            }
        }
    }
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("app", &self.app.name())
            .field("container", &self.container.id())
            .field("mount_id", &self.mounted.mount_id)
            .field("location", &self.current())
            .finish_non_exhaustive()
    }
}
