//! Block tree rendering.
//!
//! - [`BlockTreeRenderer`] turns content blocks into keyed host component
//!   descriptions, resolving symbols along the way.
//! - [`hydrate`](BlockTreeRenderer::hydrate) runs the delegated fetch cycle
//!   for symbols whose content lives elsewhere.
//! - [`html`] is a host substrate that serializes the result to HTML.

mod hydrate;
pub mod html;
mod registry;
mod tree;

pub use registry::{ComponentRegistry, HostComponent, TEXT_COMPONENT};
pub use tree::{
    BlockOutput, BlockTreeRenderer, RenderScope, RenderedContent, RenderedNode, RenderedTree,
    SymbolBody, SymbolOutput, SymbolWrapper,
};
