//! Symbol resolution and per-slot change detection.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::fetch::{FetchRequest, FetchTarget};
use super::key::{RenderCacheKey, cache_key};
use crate::context::ExecutionContext;
use crate::hash::Fingerprint;
use crate::model::{Content, Props, SymbolDescriptor, SymbolProps};

/// How a symbol is to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderDecision {
    /// Nothing renderable; show placeholder text.
    Placeholder,
    /// Content carried by the symbol itself.
    InlineContent(InlineRender),
    /// Content must be fetched before it can be rendered.
    DelegatedFetch(DelegatedFetch),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineRender {
    pub content: Content,
    /// Ambient state for the content's render.
    pub data: Props,
}

/// Parameters of a delegated fetch-and-render cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatedFetch {
    pub model_name: String,
    /// `None` for dynamic symbols.
    pub entry_id: Option<String>,
    pub cache_key: Option<RenderCacheKey>,
    /// Symbol data, merged with ambient state when `inherited_state` is set.
    pub data: Props,
    pub inherited_state: bool,
}

impl DelegatedFetch {
    pub fn request(&self) -> FetchRequest {
        let target = match &self.entry_id {
            Some(entry) => FetchTarget::Entry(entry.clone()),
            None => FetchTarget::Targeted,
        };
        FetchRequest {
            model_name: self.model_name.clone(),
            target,
            data: self.data.clone(),
            cache_key: self.cache_key.clone(),
        }
    }
}

/// Merge the symbol's own data with the enclosing render's state.
///
/// Ambient state wins on key collision.
pub fn merge_data(symbol: &SymbolDescriptor, ambient_state: &Props) -> Props {
    let mut data = symbol.data_or_empty();
    if symbol.inherit_parent_state {
        for (key, value) in ambient_state {
            data.insert(key.clone(), value.clone());
        }
    }
    data
}

/// Decide how to render a symbol block.
///
/// This is a pure function of its inputs; change detection across render
/// passes lives in [`SymbolResolver`].
pub fn resolve_symbol(
    props: &SymbolProps,
    ambient_state: &Props,
    ctx: &ExecutionContext,
) -> RenderDecision {
    let Some(symbol) = props.descriptor() else {
        tracing::debug!("No symbol supplied, rendering placeholder");
        return RenderDecision::Placeholder;
    };
    if !symbol.is_resolvable() {
        tracing::debug!(identity = %props.slot_identity(), "Unresolvable symbol, rendering placeholder");
        return RenderDecision::Placeholder;
    }

    let data = merge_data(&symbol, ambient_state);

    if let Some(content) = symbol.inline_content.clone() {
        return RenderDecision::InlineContent(InlineRender { content, data });
    }

    match symbol.model_name.as_deref() {
        Some(model_name) if symbol.has_source() => {
            let entry_id = if symbol.is_dynamic {
                None
            } else {
                symbol.entry_id.clone()
            };
            RenderDecision::DelegatedFetch(DelegatedFetch {
                model_name: model_name.to_string(),
                entry_id,
                cache_key: cache_key(&symbol, ctx),
                data,
                inherited_state: symbol.inherit_parent_state,
            })
        }
        // Flagged inline but nothing embedded yet: render it empty.
        _ => RenderDecision::InlineContent(InlineRender {
            content: Content::default(),
            data,
        }),
    }
}

/// Result of resolving a symbol in a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub decision: RenderDecision,
    /// False when an editing re-resolution saw structurally identical input.
    pub changed: bool,
    /// Content fetched for this slot on an earlier pass, if any.
    pub content: Option<Content>,
}

#[derive(Debug, Default)]
struct SymbolSlot {
    fingerprint: Option<Fingerprint>,
    decision: Option<RenderDecision>,
    content: Option<Content>,
}

#[derive(Serialize)]
struct CombinedInput<'a> {
    props: &'a SymbolProps,
    state: &'a Props,
}

/// Resolves symbols across render passes.
///
/// Each slot is addressed by a caller-supplied id that must be stable across
/// passes (the renderer uses the block path plus the symbol's identity key).
/// Slots not visited between [`begin_pass`](Self::begin_pass) and
/// [`end_pass`](Self::end_pass) are dropped.
#[derive(Debug, Default)]
pub struct SymbolResolver {
    ctx: ExecutionContext,
    slots: HashMap<String, SymbolSlot>,
    visited: HashSet<String>,
}

impl SymbolResolver {
    pub fn new(ctx: ExecutionContext) -> Self {
        Self {
            ctx,
            ..Default::default()
        }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    pub fn begin_pass(&mut self) {
        self.visited.clear();
    }

    /// Drop slots that were not visited since the last `begin_pass`.
    pub fn end_pass(&mut self) {
        let before = self.slots.len();
        let visited = &self.visited;
        self.slots.retain(|id, _| visited.contains(id));
        let dropped = before - self.slots.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Dropped unvisited symbol slots");
        }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Resolve a symbol in the given slot.
    ///
    /// In an editing context, input that hashes the same as the slot's
    /// previous input returns the previous decision with `changed == false`,
    /// so the caller can reuse what it rendered before instead of fetching
    /// again. Outside the editor every resolution counts as changed and no
    /// hashing is done.
    pub fn resolve(&mut self, slot_id: &str, props: &SymbolProps, ambient_state: &Props) -> Resolution {
        self.visited.insert(slot_id.to_string());
        let slot = self.slots.entry(slot_id.to_string()).or_default();

        let fingerprint = if self.ctx.editing {
            let inherits = props.inherit_state
                || props.symbol.as_ref().is_some_and(|s| s.inherit_parent_state);
            let empty = Props::new();
            let input = CombinedInput {
                props,
                state: if inherits { ambient_state } else { &empty },
            };
            match Fingerprint::of(&input) {
                Ok(fingerprint) => Some(fingerprint),
                Err(e) => {
                    tracing::warn!(slot = slot_id, error = %e, "Could not fingerprint symbol input");
                    None
                }
            }
        } else {
            None
        };

        if let (Some(new), Some(old), Some(decision)) =
            (&fingerprint, &slot.fingerprint, &slot.decision)
            && new == old
        {
            tracing::trace!(slot = slot_id, "Symbol input unchanged");
            return Resolution {
                decision: decision.clone(),
                changed: false,
                content: slot.content.clone(),
            };
        }

        let decision = resolve_symbol(props, ambient_state, &self.ctx);
        if slot.decision.as_ref() != Some(&decision) {
            slot.content = None;
        }
        slot.fingerprint = fingerprint;
        slot.decision = Some(decision.clone());

        Resolution {
            decision,
            changed: true,
            content: None,
        }
    }

    /// Remember content fetched for a slot.
    pub fn record_content(&mut self, slot_id: &str, content: Content) {
        if let Some(slot) = self.slots.get_mut(slot_id) {
            slot.content = Some(content);
        }
    }

    pub fn slot_content(&self, slot_id: &str) -> Option<&Content> {
        self.slots.get(slot_id)?.content.as_ref()
    }
}
