//! Symbol descriptors: references to externally stored content.

use serde::{Deserialize, Serialize};
use serde_json::Map;

use super::{Content, ContentBlock, Props};

/// Component name that marks a block as a symbol.
pub const SYMBOL_COMPONENT: &str = "Symbol";

/// Where a symbol's content comes from.
///
/// Renderable iff `model_name` is set together with `entry_id` or
/// `is_dynamic`, or inline content is present. Anything else resolves to a
/// placeholder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SymbolDescriptor {
    #[serde(rename = "model", default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(rename = "entry", default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(rename = "content", default, skip_serializing_if = "Option::is_none")]
    pub inline_content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Props>,
    #[serde(rename = "dynamic", default)]
    pub is_dynamic: bool,
    #[serde(rename = "inline", default)]
    pub is_inline: bool,
    #[serde(rename = "inheritState", default)]
    pub inherit_parent_state: bool,
}

impl SymbolDescriptor {
    /// A symbol pointing at a fixed entry of a model.
    pub fn entry(model: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            model_name: Some(model.into()),
            entry_id: Some(entry.into()),
            ..Default::default()
        }
    }

    /// A symbol whose content is chosen by runtime targeting.
    pub fn dynamic(model: impl Into<String>) -> Self {
        Self {
            model_name: Some(model.into()),
            is_dynamic: true,
            ..Default::default()
        }
    }

    /// A symbol carrying its content inline.
    pub fn inline(content: Content) -> Self {
        Self {
            inline_content: Some(content),
            is_inline: true,
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: Props) -> Self {
        self.data = Some(data);
        self
    }

    pub fn inheriting_state(mut self) -> Self {
        self.inherit_parent_state = true;
        self
    }

    /// Model name plus an entry id or dynamic targeting.
    pub fn has_source(&self) -> bool {
        self.model_name.as_deref().is_some_and(|m| !m.is_empty())
            && (self.entry_id.as_deref().is_some_and(|e| !e.is_empty()) || self.is_dynamic)
    }

    /// Whether this descriptor can be rendered at all.
    pub fn is_resolvable(&self) -> bool {
        self.has_source() || self.inline_content.is_some() || self.is_inline
    }

    /// The symbol's own data, or an empty bag.
    pub fn data_or_empty(&self) -> Props {
        self.data.clone().unwrap_or_default()
    }
}

/// Options of a `Symbol` component block.
///
/// `dynamic` and `inheritState` may be set either here or on the descriptor;
/// [`SymbolProps::descriptor`] folds both into one effective descriptor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SymbolProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolDescriptor>,
    pub dynamic: bool,
    pub inherit_state: bool,
    /// Render the content without a wrapper element.
    pub data_only: bool,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Props,
}

impl SymbolProps {
    pub fn new(symbol: SymbolDescriptor) -> Self {
        Self {
            symbol: Some(symbol),
            ..Default::default()
        }
    }

    /// Read symbol options off a block. Malformed options are treated as an
    /// empty symbol, which resolves to a placeholder.
    pub fn from_block(block: &ContentBlock) -> Self {
        let Some(component) = &block.component else {
            return Self::default();
        };
        match serde_json::from_value(serde_json::Value::Object(component.options.clone())) {
            Ok(props) => props,
            Err(e) => {
                tracing::warn!(block = %block.id, error = %e, "Malformed symbol options");
                Self::default()
            }
        }
    }

    /// The effective descriptor with component-level flags applied.
    pub fn descriptor(&self) -> Option<SymbolDescriptor> {
        let mut symbol = self.symbol.clone()?;
        symbol.is_dynamic |= self.dynamic;
        symbol.inherit_parent_state |= self.inherit_state;
        Some(symbol)
    }

    /// Stable identity of the rendering slot, independent of data and content.
    pub fn slot_identity(&self) -> String {
        let symbol = self.symbol.as_ref();
        let model = symbol
            .and_then(|s| s.model_name.as_deref())
            .filter(|m| !m.is_empty())
            .unwrap_or("no model");
        let entry = symbol
            .and_then(|s| s.entry_id.as_deref())
            .filter(|e| !e.is_empty())
            .unwrap_or("no entry");
        format!("{model}:{entry}")
    }
}
