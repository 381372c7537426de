//! Per-block responsive style declarations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// camelCase CSS property name to value (`{"marginTop": "10px"}`).
pub type StyleDeclarations = Map<String, Value>;

/// Styles for each breakpoint, from widest to narrowest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponsiveStyles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large: Option<StyleDeclarations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<StyleDeclarations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small: Option<StyleDeclarations>,
}

impl ResponsiveStyles {
    /// Styles that apply at every width.
    pub fn large(declarations: StyleDeclarations) -> Self {
        Self {
            large: Some(declarations),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        [&self.large, &self.medium, &self.small]
            .into_iter()
            .all(|d| d.as_ref().is_none_or(|m| m.is_empty()))
    }
}
