//! Client-side routing for links inside rendered content.
//!
//! Content authors write plain anchors. When content is embedded in an app
//! with its own router, a same-origin click should become a client-side
//! route transition instead of a full page load. [`NavigationInterceptor`]
//! decides per click:
//!
//! ```text
//! Idle -> Evaluating -> Suppressed  -> Idle
//!                    -> Routing     -> Idle   (route succeeded, scroll to top)
//!                    -> FallingBack -> Idle   (route failed or timed out)
//! ```
//!
//! A route transition that does not settle within the configured timeout is
//! raced, not cancelled: the hard navigation happens, the pending transition
//! is handed to a [`LocalSpawn`] to run to completion, and its late result
//! is ignored.

mod dom;
mod url;

use std::cell::Cell;
use std::fmt;

use futures::future::{Either, LocalBoxFuture, select};
use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::context::{ExecutionContext, NavigationConfig};

pub use self::url::{absolute_url, convert_to_relative, is_relative};
pub use dom::{ClickEvent, Router, Timer, UiNode, Window, find_anchor};

/// Interceptor state. Always `Idle` between clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    Idle,
    Evaluating,
    Routing,
    FallingBack,
}

/// Why a click was left to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    /// Not running in a browser.
    NotBrowser,
    /// Routing interception is turned off.
    Disabled,
    NotPrimaryButton,
    /// Ctrl or meta held: open in a new context.
    ModifierKey,
    /// Something upstream already prevented the default action.
    AlreadyHandled,
    /// No link with an `href` between the target and the bound element.
    NoAnchor,
    /// The anchor asks for a specific browsing context.
    ExplicitTarget,
    CrossOrigin,
}

/// Why a client-side route fell back to a full page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    RouteFailed,
    TimedOut,
}

/// What happened to one click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Suppressed(SuppressReason),
    /// A route listener prevented the default; it owns the navigation.
    HandledByListener,
    /// Routed on the client to this path.
    Routed(String),
    /// Fell back to a full load of this URL.
    FellBack { url: String, reason: FallbackReason },
}

/// A cancellable routing intent passed to listeners before the client
/// route is attempted.
pub struct NavigationRequest<N> {
    /// The link's href as written.
    pub url: String,
    pub anchor: N,
    default_prevented: Cell<bool>,
}

impl<N> NavigationRequest<N> {
    pub fn new(url: impl Into<String>, anchor: N) -> Self {
        Self {
            url: url.into(),
            anchor,
            default_prevented: Cell::new(false),
        }
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

impl<N: fmt::Debug> fmt::Debug for NavigationRequest<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationRequest")
            .field("url", &self.url)
            .field("anchor", &self.anchor)
            .field("default_prevented", &self.default_prevented.get())
            .finish()
    }
}

type RouteListener<N> = Box<dyn Fn(&NavigationRequest<N>)>;

/// Turns same-origin anchor clicks into client-side route transitions.
pub struct NavigationInterceptor<N, R, T, W, S> {
    ctx: ExecutionContext,
    config: NavigationConfig,
    router: R,
    timer: T,
    window: W,
    spawner: S,
    listeners: Vec<RouteListener<N>>,
    state: Cell<NavigationState>,
}

impl<N, R, T, W, S> NavigationInterceptor<N, R, T, W, S>
where
    N: UiNode,
    R: Router,
    T: Timer,
    W: Window,
    S: LocalSpawn,
{
    /// `spawner` keeps route transitions running after they lose the race.
    pub fn new(
        ctx: ExecutionContext,
        config: NavigationConfig,
        router: R,
        timer: T,
        window: W,
        spawner: S,
    ) -> Self {
        Self {
            ctx,
            config,
            router,
            timer,
            window,
            spawner,
            listeners: Vec::new(),
            state: Cell::new(NavigationState::Idle),
        }
    }

    /// Register a listener for routing intents.
    ///
    /// Listeners run in registration order; any of them may call
    /// [`NavigationRequest::prevent_default`] to take over the navigation.
    pub fn on_route(&mut self, listener: impl Fn(&NavigationRequest<N>) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn state(&self) -> NavigationState {
        self.state.get()
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Handle one click.
    pub async fn handle_click<E>(&self, event: &E) -> NavigationOutcome
    where
        E: ClickEvent<Node = N>,
    {
        self.transition(NavigationState::Evaluating);
        let outcome = match self.evaluate(event) {
            Ok(url) => self.route(event, url).await,
            Err(outcome) => outcome,
        };
        self.transition(NavigationState::Idle);
        outcome
    }

    /// Decide whether to route. `Ok` carries the relative URL.
    fn evaluate<E>(&self, event: &E) -> Result<String, NavigationOutcome>
    where
        E: ClickEvent<Node = N>,
    {
        if !self.ctx.browser {
            return Err(self.suppress(SuppressReason::NotBrowser));
        }
        if !self.config.handle_routing {
            return Err(self.suppress(SuppressReason::Disabled));
        }
        if event.button() != 0 {
            return Err(self.suppress(SuppressReason::NotPrimaryButton));
        }
        if event.ctrl_key() {
            return Err(self.suppress(SuppressReason::ModifierKey));
        }
        if event.default_prevented() {
            return Err(self.suppress(SuppressReason::AlreadyHandled));
        }

        let Some(anchor) = find_anchor(event) else {
            return Err(self.suppress(SuppressReason::NoAnchor));
        };
        if anchor.attribute("target").is_some() {
            return Err(self.suppress(SuppressReason::ExplicitTarget));
        }
        let Some(href) = anchor.attribute("href").filter(|h| !h.is_empty()) else {
            return Err(self.suppress(SuppressReason::NoAnchor));
        };

        let request = NavigationRequest::new(href.clone(), anchor);
        for listener in &self.listeners {
            listener(&request);
        }
        if request.is_default_prevented() {
            tracing::debug!(%href, "Route handled by listener");
            event.prevent_default();
            return Err(NavigationOutcome::HandledByListener);
        }

        if event.meta_key() {
            return Err(self.suppress(SuppressReason::ModifierKey));
        }

        // Relative hrefs are routed as written, fragment included.
        let url = if is_relative(&href) {
            href
        } else {
            convert_to_relative(&href, &self.window.location())
        };
        if !is_relative(&url) {
            tracing::debug!(%url, "Leaving cross-origin link to the browser");
            return Err(self.suppress(SuppressReason::CrossOrigin));
        }
        Ok(url)
    }

    async fn route<E: ClickEvent>(&self, event: &E, url: String) -> NavigationOutcome {
        event.prevent_default();
        self.transition(NavigationState::Routing);

        let navigate = self.router.navigate_by_url(&url);
        let timeout = self.timer.sleep(self.config.timeout());
        let raced = select(navigate, timeout).await;
        let reason = match raced {
            Either::Left((true, _)) => {
                self.window.scroll_to(0.0, 0.0);
                tracing::debug!(%url, "Routed on the client");
                return NavigationOutcome::Routed(url);
            }
            Either::Left((false, _)) => FallbackReason::RouteFailed,
            Either::Right(((), navigate)) => {
                self.detach(navigate);
                FallbackReason::TimedOut
            }
        };

        self.transition(NavigationState::FallingBack);
        let full = absolute_url(&url, &self.window.location());
        tracing::warn!(%url, ?reason, "Client route did not complete, loading page");
        self.window.assign(&full);
        NavigationOutcome::FellBack { url: full, reason }
    }

    /// Let a transition that lost the race run to completion unobserved.
    fn detach(&self, navigate: LocalBoxFuture<'static, bool>) {
        let spawned = self.spawner.spawn_local(async move {
            let routed = navigate.await;
            tracing::trace!(routed, "Late client route settled");
        });
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "Could not keep late client route running");
        }
    }

    fn suppress(&self, reason: SuppressReason) -> NavigationOutcome {
        tracing::trace!(?reason, "Click left to the browser");
        NavigationOutcome::Suppressed(reason)
    }

    fn transition(&self, state: NavigationState) {
        tracing::trace!(from = ?self.state.get(), to = ?state, "Navigation state");
        self.state.set(state);
    }
}
