//! Symbols: references from a content tree to externally stored content.
//!
//! A symbol block resolves to one of three [`RenderDecision`]s. Placeholder
//! and inline decisions render immediately; delegated decisions carry the
//! parameters of a [`FetchRequest`] for a [`ContentFetcher`], whose result
//! is cached in a [`RenderCache`] under the symbol's [`RenderCacheKey`].

mod fetch;
mod key;
mod resolver;

pub use fetch::{ContentFetcher, DirectoryFetcher, FetchRequest, FetchTarget, RenderCache};
pub use key::{MAX_FINGERPRINT_SUFFIX_LEN, RenderCacheKey, cache_key};
pub use resolver::{
    DelegatedFetch, InlineRender, RenderDecision, Resolution, SymbolResolver, merge_data,
    resolve_symbol,
};
