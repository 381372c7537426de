//! Host components and the registry of named components.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::ContentBlock;

/// Component name of the built-in rich text block.
pub const TEXT_COMPONENT: &str = "Text";

/// What the host substrate instantiates for a rendered node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum HostComponent {
    /// A host element kind (`div`, `a`, `section`...).
    Element(String),
    /// A registered component, instantiated with the block's options.
    Component(String),
}

impl HostComponent {
    pub fn element(tag: impl Into<String>) -> Self {
        HostComponent::Element(tag.into())
    }

    pub fn name(&self) -> &str {
        match self {
            HostComponent::Element(name) | HostComponent::Component(name) => name,
        }
    }
}

/// Names of the components the host knows how to instantiate.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    names: BTreeSet<String>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(TEXT_COMPONENT);
        registry
    }
}

impl ComponentRegistry {
    /// A registry with the built-in components.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with no components at all.
    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Host component for a plain (non-symbol) block.
    ///
    /// Blocks naming an unregistered component have no host and render
    /// absent. Blocks without a component render as their tag, `div` by
    /// default.
    pub fn host_for(&self, block: &ContentBlock) -> Option<HostComponent> {
        match block.component_name() {
            Some(name) if self.contains(name) => Some(HostComponent::Component(name.to_string())),
            Some(name) => {
                tracing::warn!(block = %block.id, component = name, "Unknown component");
                None
            }
            None => Some(HostComponent::Element(
                block
                    .tag_name
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| "div".to_string()),
            )),
        }
    }
}
