//! # tessera
//!
//! A rendering engine for externally authored content trees.
//!
//! Content is authored in a visual editor and delivered as JSON: a tree of
//! blocks, a stylesheet, custom fonts and symbols (references to other
//! content entries). This crate turns that into a keyed description a host
//! UI framework can reconcile, and keeps links inside the content routing
//! through the host's client-side router.
//!
//! ## Features
//!
//! - Structural fingerprints of JSON-like values ([`hash`])
//! - Stylesheet composition with `@font-face` generation ([`style`])
//! - Symbol resolution with render caching and change detection ([`symbol`])
//! - Keyed block tree rendering and delegated fetch hydration ([`render`])
//! - Same-origin anchor interception with a timed fallback ([`navigation`])
//!
//! ## Quick Start
//!
//! ```
//! use tessera::model::Content;
//! use tessera::render::{BlockTreeRenderer, html};
//!
//! let content = Content::from_json(r#"{
//!     "data": {
//!         "cssCode": ".hero { color: red; }",
//!         "blocks": [{"id": "hero", "tagName": "section"}]
//!     }
//! }"#).unwrap();
//!
//! let mut renderer = BlockTreeRenderer::default();
//! let rendered = renderer.render_page(&content);
//! assert_eq!(rendered.tree.keys(), vec!["block-hero", "style-hero"]);
//! assert!(html::to_html(&rendered).contains("<section"));
//! ```
//!
//! ## Symbols
//!
//! Symbols whose content lives in the content service render as pending
//! until [`BlockTreeRenderer::hydrate`](render::BlockTreeRenderer::hydrate)
//! fetches them through a [`ContentFetcher`](symbol::ContentFetcher):
//!
//! ```no_run
//! use tessera::model::Content;
//! use tessera::render::BlockTreeRenderer;
//! use tessera::symbol::DirectoryFetcher;
//!
//! # async fn run(content: Content) -> tessera::Result<()> {
//! let mut renderer = BlockTreeRenderer::default();
//! let mut rendered = renderer.render_page(&content);
//! renderer.hydrate(&mut rendered, &DirectoryFetcher::new("symbols")).await?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod hash;
pub mod model;
pub mod navigation;
pub mod render;
pub mod style;
pub mod symbol;
pub(crate) mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use context::{EngineConfig, ExecutionContext, NavigationConfig, StyleTarget};
pub use error::{Error, Result};
pub use hash::Fingerprint;
pub use model::{Content, ContentBlock, CustomFont, Props, SymbolDescriptor, SymbolProps};
pub use navigation::{ClickEvent, NavigationInterceptor, NavigationOutcome, Router, Timer, UiNode, Window};
pub use render::{BlockTreeRenderer, HostComponent, RenderScope, RenderedTree};
pub use style::compose_styles;
pub use symbol::{ContentFetcher, RenderDecision, resolve_symbol};

/// Render `children` into `host` with a fresh renderer and default
/// configuration.
///
/// Symbols are resolved but not fetched; use a long-lived
/// [`BlockTreeRenderer`] to keep symbol state and the render cache across
/// passes.
pub fn render_block_tree(
    children: &[ContentBlock],
    host: Option<HostComponent>,
    props: Props,
) -> Option<RenderedTree> {
    BlockTreeRenderer::default().render(children, host, props, &RenderScope::default())
}

/// Handle an anchor click with the given interceptor.
pub async fn handle_anchor_click<N, R, T, W, S, E>(
    interceptor: &NavigationInterceptor<N, R, T, W, S>,
    event: &E,
) -> NavigationOutcome
where
    N: UiNode,
    R: Router,
    T: Timer,
    W: Window,
    S: futures::task::LocalSpawn,
    E: ClickEvent<Node = N>,
{
    interceptor.handle_click(event).await
}
