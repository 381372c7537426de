//! Delegated content fetches and the render cache.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use super::key::RenderCacheKey;
use crate::error::{Error, Result};
use crate::model::{Content, Props};

/// What content to ask the content service for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    /// A fixed entry of the model.
    Entry(String),
    /// Whatever entry the service's targeting picks for this visitor.
    Targeted,
}

/// A request handed to the external content service.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub model_name: String,
    pub target: FetchTarget,
    /// Data (and inherited state, when requested) for the fetched content.
    pub data: Props,
    pub cache_key: Option<RenderCacheKey>,
}

impl FetchRequest {
    /// Entry id, or `targeted` for dynamic requests.
    pub fn entry_label(&self) -> &str {
        match &self.target {
            FetchTarget::Entry(entry) => entry,
            FetchTarget::Targeted => "targeted",
        }
    }
}

/// The content service that supplies symbol content by model name.
///
/// Rendering runs on a single-threaded event loop, so implementations need
/// not be `Send`. Retries and timeouts belong to the implementation.
#[async_trait(?Send)]
pub trait ContentFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Content>;
}

/// Fetched content keyed by [`RenderCacheKey`].
///
/// Shared across renders of the same content region. Writes replace earlier
/// entries; the last render wins.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: HashMap<RenderCacheKey, Content>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &RenderCacheKey) -> Option<&Content> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: RenderCacheKey, content: Content) {
        self.entries.insert(key, content);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Serves symbol content from JSON files on disk.
///
/// Entry requests read `<root>/<model>/<entry>.json`; targeted requests read
/// `<root>/<model>/index.json`.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, request: &FetchRequest) -> PathBuf {
        let file = match &request.target {
            FetchTarget::Entry(entry) => format!("{entry}.json"),
            FetchTarget::Targeted => "index.json".to_string(),
        };
        self.root.join(&request.model_name).join(file)
    }
}

#[async_trait(?Send)]
impl ContentFetcher for DirectoryFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Content> {
        let path = self.path_for(request);
        tracing::debug!(path = %path.display(), "Reading symbol content");
        let text = std::fs::read_to_string(&path).map_err(|e| {
            Error::fetch(&request.model_name, request.entry_label(), e.to_string())
        })?;
        Content::from_json(&text)
    }
}
