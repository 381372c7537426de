//! Custom font descriptors for generated @font-face rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A custom font attached to a piece of content.
///
/// `files` maps a weight key to a font file URL. The `regular` key is the base
/// file; numeric keys (`"700"`) are additional weights; anything else
/// (`"italic"`) is ignored when composing styles.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFont {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    /// Generic fallback family (e.g. `sans-serif`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<BTreeMap<String, String>>,
}

impl CustomFont {
    /// Create a font with a single base file.
    pub fn new(family: impl Into<String>, file_url: impl Into<String>) -> Self {
        Self {
            family: Some(family.into()),
            file_url: Some(file_url.into()),
            ..Default::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_file(mut self, weight: impl Into<String>, url: impl Into<String>) -> Self {
        self.files
            .get_or_insert_with(BTreeMap::new)
            .insert(weight.into(), url.into());
        self
    }

    /// The URL of the base (weight 400) file: the explicit file URL, else the
    /// `regular` entry.
    pub fn base_url(&self) -> Option<&str> {
        self.file_url
            .as_deref()
            .or_else(|| self.files.as_ref()?.get("regular").map(String::as_str))
    }

    /// The CSS font-family value: the family, plus the generic kind unless the
    /// kind is a `#`-marked virtual value.
    pub fn css_family(&self) -> Option<String> {
        let family = self.family.as_deref()?;
        match self.kind.as_deref() {
            Some(kind) if !kind.contains('#') => Some(format!("{family}, {kind}")),
            _ => Some(family.to_string()),
        }
    }
}
