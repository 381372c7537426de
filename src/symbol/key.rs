//! Render cache keys for symbols.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::hash::Fingerprint;
use crate::model::SymbolDescriptor;

/// Fingerprints at or above this length are not appended to cache keys.
pub const MAX_FINGERPRINT_SUFFIX_LEN: usize = 300;

/// Key under which a symbol's fetched content may be cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderCacheKey(String);

impl RenderCacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the cache key for a symbol.
///
/// Dynamic symbols have no key: their content depends on runtime targeting,
/// not on the entry. Otherwise the key is `model:entry`, followed by a
/// fingerprint of the symbol's data outside the editor so that two uses of
/// the same entry with different data do not share a cache slot. The editor
/// always uses the bare `model:entry` key.
pub fn cache_key(symbol: &SymbolDescriptor, ctx: &ExecutionContext) -> Option<RenderCacheKey> {
    if symbol.is_dynamic {
        return None;
    }

    let mut key = format!(
        "{}:{}",
        symbol.model_name.as_deref().unwrap_or_default(),
        symbol.entry_id.as_deref().unwrap_or_default()
    );

    if !ctx.editing
        && let Some(data) = symbol.data.as_ref().filter(|d| !d.is_empty())
    {
        let fingerprint = Fingerprint::of_value(&Value::Object(data.clone()));
        if fingerprint.len() < MAX_FINGERPRINT_SUFFIX_LEN {
            key.push(':');
            key.push_str(fingerprint.as_str());
        }
    }

    Some(RenderCacheKey(key))
}
