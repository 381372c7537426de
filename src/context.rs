//! Execution context flags and engine configuration.
//!
//! The context is passed explicitly through every render and navigation call
//! rather than read from process-wide globals, so the same engine can run an
//! editing preview and a production render side by side.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default bound on a client-side route transition before falling back to a
/// full page load.
pub const DEFAULT_NAVIGATION_TIMEOUT_MS: u64 = 1000;

/// Default text shown in place of a symbol with no model or entry chosen.
pub const DEFAULT_PLACEHOLDER_TEXT: &str = "Symbols let you reuse dynamic elements across your content. \
     Please choose a model and entry for this symbol.";

/// Read-only flags describing where the engine is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionContext {
    /// Content is being rendered inside the visual editor.
    pub editing: bool,
    /// Running in a browser (client) rather than on a server.
    pub browser: bool,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            editing: false,
            browser: true,
        }
    }
}

impl ExecutionContext {
    /// Production rendering in a browser.
    pub fn browser() -> Self {
        Self::default()
    }

    /// Server-side rendering (no DOM, no navigation).
    pub fn server() -> Self {
        Self {
            editing: false,
            browser: false,
        }
    }

    /// Editor preview in a browser.
    pub fn editing() -> Self {
        Self {
            editing: true,
            browser: true,
        }
    }
}

/// How the composed stylesheet is handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleTarget {
    /// CSS text for the content of a host style element.
    #[default]
    Element,
    /// A complete style tag as raw markup, for hosts that inject a fragment.
    Markup,
}

/// Navigation interception settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationConfig {
    /// Intercept same-origin anchor clicks and route on the client.
    pub handle_routing: bool,
    /// Time allowed for a client-side route before a hard navigation.
    pub timeout_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            handle_routing: true,
            timeout_ms: DEFAULT_NAVIGATION_TIMEOUT_MS,
        }
    }
}

impl NavigationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Engine configuration. Every field is optional in JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub context: ExecutionContext,
    pub navigation: NavigationConfig,
    pub style_target: StyleTarget,
    pub placeholder_text: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context: ExecutionContext::default(),
            navigation: NavigationConfig::default(),
            style_target: StyleTarget::default(),
            placeholder_text: DEFAULT_PLACEHOLDER_TEXT.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.navigation.handle_routing && self.navigation.timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "navigation.timeoutMs must be greater than zero when routing is handled".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.navigation.handle_routing);
        assert_eq!(config.navigation.timeout(), Duration::from_millis(1000));
        assert!(!config.context.editing);
        assert!(config.context.browser);
        assert_eq!(config.style_target, StyleTarget::Element);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            EngineConfig::from_json(r#"{"context":{"editing":true},"styleTarget":"markup"}"#)
                .unwrap();
        assert!(config.context.editing);
        assert!(config.context.browser);
        assert_eq!(config.style_target, StyleTarget::Markup);
        assert_eq!(config.navigation.timeout_ms, DEFAULT_NAVIGATION_TIMEOUT_MS);
        assert_eq!(config.placeholder_text, DEFAULT_PLACEHOLDER_TEXT);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = EngineConfig::from_json(r#"{"navigation":{"timeoutMs":0}}"#);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_timeout_allowed_without_routing() {
        let config =
            EngineConfig::from_json(r#"{"navigation":{"handleRouting":false,"timeoutMs":0}}"#)
                .unwrap();
        assert!(!config.navigation.handle_routing);
    }
}
