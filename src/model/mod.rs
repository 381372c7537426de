//! Content tree data model.
//!
//! This module contains:
//! - Content blocks (the recursive tree the renderer walks)
//! - Content documents as returned by the content service
//! - Symbol descriptors (references to externally stored sub-trees)
//! - Custom font descriptors
//! - Responsive per-block styles
//!
//! The JSON shape is owned by the authoring system; everything here is
//! deserialized leniently so unknown fields are ignored and missing ones
//! default.

mod font;
mod style;
mod symbol;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

pub use font::CustomFont;
pub use style::{ResponsiveStyles, StyleDeclarations};
pub use symbol::{SYMBOL_COMPONENT, SymbolDescriptor, SymbolProps};

/// Opaque key-value bag used for properties, options, data and state.
pub type Props = Map<String, Value>;

/// A node in the content tree.
///
/// `id` must be unique among siblings and stable across re-renders; the
/// renderer derives reconciliation keys from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBlock {
    #[serde(default)]
    pub id: String,
    /// Host element kind (e.g. `div`, `a`, `section`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// Registered component this block instantiates, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsive_styles: Option<ResponsiveStyles>,
    /// Host attributes (href, target, alt...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Props,
}

/// Reference from a block to a named component and its options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Props,
}

impl ContentBlock {
    /// Create an empty block with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag_name = Some(tag.into());
        self
    }

    pub fn with_component(mut self, name: impl Into<String>, options: Props) -> Self {
        self.component = Some(ComponentRef {
            name: name.into(),
            options,
        });
        self
    }

    pub fn with_child(mut self, child: ContentBlock) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_styles(mut self, styles: ResponsiveStyles) -> Self {
        self.responsive_styles = Some(styles);
        self
    }

    /// Name of the component this block instantiates.
    pub fn component_name(&self) -> Option<&str> {
        self.component.as_ref().map(|c| c.name.as_str())
    }

    /// Whether this block embeds a symbol.
    pub fn is_symbol(&self) -> bool {
        self.component_name() == Some(SYMBOL_COMPONENT)
    }
}

/// The payload of a content entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_fonts: Vec<CustomFont>,
    /// Initial state made available to the content's blocks.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub state: Props,
}

/// A content entry, either fetched by model name or embedded inline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub data: ContentData,
}

impl Content {
    /// Wrap a list of blocks as content.
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            id: None,
            data: ContentData {
                blocks,
                ..Default::default()
            },
        }
    }

    /// Parse content from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.data.blocks
    }
}
