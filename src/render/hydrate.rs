//! The delegated fetch-and-render cycle.

use futures::future::join_all;

use super::tree::{
    BlockOutput, BlockTreeRenderer, RenderScope, RenderedContent, RenderedNode, RenderedTree,
    SymbolBody, SymbolOutput,
};
use crate::error::{Error, Result};
use crate::model::Content;
use crate::symbol::{ContentFetcher, DelegatedFetch, FetchRequest};

impl BlockTreeRenderer {
    /// Fill every pending delegated symbol in `rendered`.
    ///
    /// Cache hits are used directly; misses are fetched concurrently and
    /// the results are placed back in document order. Fetched content may
    /// itself contain delegated symbols, so this repeats until nothing is
    /// pending. Returns the number of slots filled.
    ///
    /// The first fetch failure is returned; slots filled before it keep
    /// their content.
    pub async fn hydrate<F>(&mut self, rendered: &mut RenderedContent, fetcher: &F) -> Result<usize>
    where
        F: ContentFetcher + ?Sized,
    {
        let mut filled = 0;
        loop {
            let mut pending = Vec::new();
            collect_pending(&mut rendered.tree, &mut pending);
            if pending.is_empty() {
                return Ok(filled);
            }

            let mut contents: Vec<Option<Content>> = pending
                .iter()
                .map(|(fetch, _)| fetch.cache_key.as_ref().and_then(|k| self.cached(k)).cloned())
                .collect();
            let misses: Vec<usize> = contents
                .iter()
                .enumerate()
                .filter(|(_, content)| content.is_none())
                .map(|(i, _)| i)
                .collect();
            let requests: Vec<FetchRequest> = misses.iter().map(|&i| pending[i].0.request()).collect();

            tracing::debug!(
                pending = pending.len(),
                fetching = requests.len(),
                "Hydrating delegated symbols"
            );

            let results = join_all(requests.iter().map(|request| fetcher.fetch(request))).await;
            let mut failure = None;
            for ((&i, request), result) in misses.iter().zip(&requests).zip(results) {
                match result {
                    Ok(content) => {
                        if let Some(key) = &request.cache_key {
                            self.cache.insert(key.clone(), content.clone());
                        }
                        contents[i] = Some(content);
                    }
                    Err(e) if failure.is_none() => failure = Some(as_fetch_error(e, request)),
                    Err(e) => tracing::debug!(error = %e, "Further symbol fetch failed"),
                }
            }
            // Successful siblings stay cached for the next pass.
            if let Some(e) = failure {
                return Err(e);
            }

            for ((fetch, output), content) in pending.into_iter().zip(contents) {
                let Some(content) = content else {
                    continue;
                };
                self.symbols.record_content(&output.slot, content.clone());
                let scope = RenderScope::within_slot(&output.slot, fetch.data);
                output.body = SymbolBody::Rendered(Box::new(self.render_content(&content, &scope)));
                filled += 1;
            }
        }
    }
}

fn as_fetch_error(error: Error, request: &FetchRequest) -> Error {
    match error {
        Error::Fetch { .. } => error,
        other => Error::fetch(&request.model_name, request.entry_label(), other.to_string()),
    }
}

/// Collect pending symbol slots in document order.
fn collect_pending<'a>(tree: &'a mut RenderedTree, out: &mut Vec<(DelegatedFetch, &'a mut SymbolOutput)>) {
    for node in &mut tree.children {
        let RenderedNode::Block { output, .. } = node else {
            continue;
        };
        match output {
            BlockOutput::Tree(child) => collect_pending(child, out),
            BlockOutput::Symbol(symbol) => {
                if let SymbolBody::Pending(fetch) = &symbol.body {
                    let fetch = fetch.clone();
                    out.push((fetch, symbol));
                } else if let SymbolBody::Rendered(content) = &mut symbol.body {
                    collect_pending(&mut content.tree, out);
                }
            }
            BlockOutput::Absent => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{EngineConfig, ExecutionContext};
    use crate::model::{ContentBlock, SYMBOL_COMPONENT};
    use async_trait::async_trait;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapFetcher {
        entries: HashMap<String, Content>,
        calls: RefCell<Vec<String>>,
    }

    impl MapFetcher {
        fn with(mut self, entry: &str, content: Content) -> Self {
            self.entries.insert(entry.to_string(), content);
            self
        }
    }

    #[async_trait(?Send)]
    impl ContentFetcher for MapFetcher {
        async fn fetch(&self, request: &FetchRequest) -> Result<Content> {
            let entry = request.entry_label().to_string();
            self.calls.borrow_mut().push(entry.clone());
            self.entries
                .get(&entry)
                .cloned()
                .ok_or_else(|| Error::fetch(&request.model_name, &entry, "not found"))
        }
    }

    fn symbol_block(id: &str, entry: &str) -> ContentBlock {
        ContentBlock::new(id).with_component(
            SYMBOL_COMPONENT,
            json!({"symbol": {"model": "symbol", "entry": entry}})
                .as_object()
                .cloned()
                .unwrap(),
        )
    }

    fn symbol_at(tree: &RenderedTree, index: usize) -> &SymbolOutput {
        match &tree.children[index] {
            RenderedNode::Block {
                output: BlockOutput::Symbol(symbol),
                ..
            } => symbol,
            other => panic!("Expected symbol, got {other:?}"),
        }
    }

    fn server_renderer() -> BlockTreeRenderer {
        BlockTreeRenderer::new(EngineConfig {
            context: ExecutionContext::server(),
            ..Default::default()
        })
    }

    #[test]
    fn test_hydrate_fills_in_order() {
        let fetcher = MapFetcher::default()
            .with("one", Content::from_blocks(vec![ContentBlock::new("first")]))
            .with("two", Content::from_blocks(vec![ContentBlock::new("second")]));
        let mut renderer = server_renderer();
        let page = Content::from_blocks(vec![symbol_block("a", "one"), symbol_block("b", "two")]);

        let mut rendered = renderer.render_page(&page);
        let filled = futures::executor::block_on(renderer.hydrate(&mut rendered, &fetcher)).unwrap();
        assert_eq!(filled, 2);
        assert_eq!(rendered.tree.pending_count(), 0);

        for (index, expected) in [(0, "block-first"), (1, "block-second")] {
            let SymbolBody::Rendered(content) = &symbol_at(&rendered.tree, index).body else {
                panic!("Expected rendered content");
            };
            assert_eq!(content.tree.keys()[0], expected);
        }
        assert_eq!(renderer.cache().len(), 2);
    }

    #[test]
    fn test_nested_symbols_are_hydrated() {
        let fetcher = MapFetcher::default()
            .with("outer", Content::from_blocks(vec![symbol_block("n", "inner")]))
            .with("inner", Content::from_blocks(vec![ContentBlock::new("leaf")]));
        let mut renderer = server_renderer();
        let mut rendered = renderer.render_page(&Content::from_blocks(vec![symbol_block("a", "outer")]));

        let filled = futures::executor::block_on(renderer.hydrate(&mut rendered, &fetcher)).unwrap();
        assert_eq!(filled, 2);
        assert_eq!(*fetcher.calls.borrow(), vec!["outer", "inner"]);
    }

    #[test]
    fn test_cached_content_skips_fetch() {
        let fetcher = MapFetcher::default().with("one", Content::default());
        let mut renderer = server_renderer();
        let page = Content::from_blocks(vec![symbol_block("a", "one")]);

        let mut rendered = renderer.render_page(&page);
        futures::executor::block_on(renderer.hydrate(&mut rendered, &fetcher)).unwrap();

        let mut again = renderer.render_page(&page);
        assert_eq!(again.tree.pending_count(), 0);
        let filled = futures::executor::block_on(renderer.hydrate(&mut again, &fetcher)).unwrap();
        assert_eq!(filled, 0);
        assert_eq!(fetcher.calls.borrow().len(), 1);
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let fetcher = MapFetcher::default();
        let mut renderer = server_renderer();
        let mut rendered = renderer.render_page(&Content::from_blocks(vec![symbol_block("a", "missing")]));

        let err = futures::executor::block_on(renderer.hydrate(&mut rendered, &fetcher)).unwrap_err();
        assert!(matches!(err, Error::Fetch { ref entry, .. } if entry == "missing"));
        assert_eq!(rendered.tree.pending_count(), 1);
    }

    #[test]
    fn test_failed_fetch_keeps_sibling_in_cache() {
        let fetcher = MapFetcher::default().with("present", Content::from_blocks(vec![ContentBlock::new("ok")]));
        let mut renderer = server_renderer();
        let page = Content::from_blocks(vec![symbol_block("a", "missing"), symbol_block("b", "present")]);
        let mut rendered = renderer.render_page(&page);

        let err = futures::executor::block_on(renderer.hydrate(&mut rendered, &fetcher)).unwrap_err();
        assert!(matches!(err, Error::Fetch { ref entry, .. } if entry == "missing"));
        assert_eq!(renderer.cache().len(), 1);

        let again = renderer.render_page(&page);
        assert_eq!(again.tree.pending_count(), 1);
        assert!(matches!(symbol_at(&again.tree, 1).body, SymbolBody::Rendered(_)));
    }

    #[test]
    fn test_fetched_content_sees_symbol_data() {
        let content: Content = serde_json::from_value(json!({
            "data": {"state": {"title": "default", "theme": "light"}, "blocks": [{"id": "x"}]}
        }))
        .unwrap();
        let fetcher = MapFetcher::default().with("one", content);
        let mut renderer = server_renderer();
        let block = ContentBlock::new("a").with_component(
            SYMBOL_COMPONENT,
            json!({"symbol": {"model": "symbol", "entry": "one", "data": {"title": "Hi"}}})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let mut rendered = renderer.render_page(&Content::from_blocks(vec![block]));
        futures::executor::block_on(renderer.hydrate(&mut rendered, &fetcher)).unwrap();

        let SymbolBody::Rendered(symbol) = &symbol_at(&rendered.tree, 0).body else {
            panic!("Expected rendered content");
        };
        assert_eq!(symbol.state["title"], json!("Hi"));
        assert_eq!(symbol.state["theme"], json!("light"));
    }
}
