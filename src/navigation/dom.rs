//! Host abstractions the navigation interceptor runs against.
//!
//! These traits keep the interceptor independent of any particular UI
//! toolkit: a browser binding implements them over DOM nodes and events,
//! tests implement them over plain structs.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use url::Url;

/// An element in the host's UI tree.
pub trait UiNode: Clone + PartialEq {
    fn parent(&self) -> Option<Self>;

    /// Whether this element is a link (an `a` element or equivalent).
    fn is_anchor(&self) -> bool;

    fn attribute(&self, name: &str) -> Option<String>;
}

/// A pointer click delivered to a bound element.
pub trait ClickEvent {
    type Node: UiNode;

    /// Mouse button; 0 is the primary button.
    fn button(&self) -> i16;
    fn ctrl_key(&self) -> bool;
    fn meta_key(&self) -> bool;
    fn default_prevented(&self) -> bool;
    fn prevent_default(&self);

    /// The element the click landed on.
    fn target(&self) -> Option<Self::Node>;
    /// The element the handler is bound to.
    fn current_target(&self) -> Option<Self::Node>;
}

/// The host framework's client-side router.
///
/// The returned future must own what it needs: when the timeout wins the
/// race it outlives the click and is handed to the interceptor's spawner,
/// which drives it to completion and discards the result.
pub trait Router {
    /// Resolves to `true` when the route transition succeeded.
    fn navigate_by_url(&self, url: &str) -> LocalBoxFuture<'static, bool>;
}

#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// The browsing context the content is shown in.
pub trait Window {
    /// URL of the current document.
    fn location(&self) -> Url;
    fn scroll_to(&self, x: f64, y: f64);
    /// Full document load of `url`.
    fn assign(&self, url: &str);
}

/// Walk from the click target up to (not past) the bound element looking
/// for a link with a non-empty `href`.
pub fn find_anchor<E: ClickEvent>(event: &E) -> Option<E::Node> {
    let bound = event.current_target();
    let mut node = event.target();
    while let Some(current) = node {
        if current.is_anchor() && current.attribute("href").is_some_and(|h| !h.is_empty()) {
            return Some(current);
        }
        if bound.as_ref() == Some(&current) {
            return None;
        }
        node = current.parent();
    }
    None
}
