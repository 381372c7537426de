//! The block tree renderer.
//!
//! Rendering turns a list of content blocks into a [`RenderedTree`]: a host
//! component description whose children are one keyed output per block
//! followed by one keyed style output per block. The host reconciles
//! children by key, so keys are derived from block ids and stay stable across
//! passes.
//!
//! Symbol blocks are resolved through the [`SymbolResolver`]. Delegated
//! symbols whose content is not available yet are left as
//! [`SymbolBody::Pending`] and filled in by
//! [`hydrate`](BlockTreeRenderer::hydrate).

use serde::Serialize;
use serde_json::Value;

use super::registry::{ComponentRegistry, HostComponent};
use crate::context::{EngineConfig, ExecutionContext};
use crate::model::{Content, ContentBlock, Props, SymbolProps};
use crate::style::{InjectedStyle, block_css, compose_styles, inject};
use crate::symbol::{
    DelegatedFetch, InlineRender, RenderCache, RenderCacheKey, RenderDecision, SymbolResolver,
};

/// A host component populated with props and keyed children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedTree {
    pub component: HostComponent,
    /// Host attributes.
    pub props: Props,
    /// Component options, for [`HostComponent::Component`] hosts.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: Props,
    pub children: Vec<RenderedNode>,
}

impl RenderedTree {
    /// Keys of the direct children, in order.
    pub fn keys(&self) -> Vec<&str> {
        self.children.iter().map(RenderedNode::key).collect()
    }

    /// Number of delegated symbols anywhere below this tree still awaiting
    /// content.
    pub fn pending_count(&self) -> usize {
        self.children
            .iter()
            .map(|node| match node {
                RenderedNode::Block { output, .. } => output.pending_count(),
                RenderedNode::Style { .. } => 0,
            })
            .sum()
    }
}

/// A keyed child of a rendered tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RenderedNode {
    /// Keyed `block-{id}`.
    Block { key: String, output: BlockOutput },
    /// Keyed `style-{id}`; `css` may be empty.
    Style { key: String, css: String },
}

impl RenderedNode {
    pub fn key(&self) -> &str {
        match self {
            RenderedNode::Block { key, .. } | RenderedNode::Style { key, .. } => key,
        }
    }
}

/// What one block rendered to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BlockOutput {
    Tree(RenderedTree),
    Symbol(SymbolOutput),
    /// The block has no host component to render into.
    Absent,
}

impl BlockOutput {
    fn pending_count(&self) -> usize {
        match self {
            BlockOutput::Tree(tree) => tree.pending_count(),
            BlockOutput::Symbol(symbol) => match &symbol.body {
                SymbolBody::Pending(_) => 1,
                SymbolBody::Rendered(content) => content.tree.pending_count(),
                SymbolBody::Placeholder(_) => 0,
            },
            BlockOutput::Absent => 0,
        }
    }
}

/// A rendered symbol slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolOutput {
    /// Slot id under which the resolver keeps this symbol's state.
    pub slot: String,
    /// Identity key for host reconciliation, `model:entry`.
    pub identity: String,
    /// Wrapper element, absent for data-only symbols.
    pub wrapper: Option<SymbolWrapper>,
    pub body: SymbolBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolWrapper {
    pub tag: String,
    pub props: Props,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum SymbolBody {
    Placeholder(String),
    /// Awaiting a delegated fetch.
    Pending(DelegatedFetch),
    Rendered(Box<RenderedContent>),
}

/// One content entry rendered together with its stylesheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedContent {
    pub id: Option<String>,
    /// Ambient state the content's blocks are bound to.
    pub state: Props,
    #[serde(serialize_with = "serialize_style")]
    pub style: InjectedStyle,
    pub tree: RenderedTree,
}

fn serialize_style<S: serde::Serializer>(style: &InjectedStyle, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(style.css())
}

/// Ambient state and slot path for one level of rendering.
#[derive(Debug, Clone, Default)]
pub struct RenderScope {
    pub state: Props,
    path: String,
}

impl RenderScope {
    pub fn root(state: Props) -> Self {
        Self {
            state,
            path: String::new(),
        }
    }

    /// Scope for content rendered inside a symbol slot.
    pub fn within_slot(slot: &str, state: Props) -> Self {
        Self {
            state,
            path: slot.to_string(),
        }
    }

    fn slot_id(&self, block_id: &str, identity: &str) -> String {
        format!("{}/{}#{}", self.path, block_id, identity)
    }
}

/// How a block renders, decided once per block per pass.
enum BlockKind {
    Plain(Option<HostComponent>),
    Symbol(SymbolProps),
}

/// Renders block trees into host component descriptions.
///
/// Holds the per-slot symbol state and the render cache, so one renderer
/// should be kept per logical content region and reused across passes.
#[derive(Debug)]
pub struct BlockTreeRenderer {
    pub(super) config: EngineConfig,
    registry: ComponentRegistry,
    pub(super) symbols: SymbolResolver,
    pub(super) cache: RenderCache,
}

impl Default for BlockTreeRenderer {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl BlockTreeRenderer {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            symbols: SymbolResolver::new(config.context),
            registry: ComponentRegistry::new(),
            cache: RenderCache::new(),
            config,
        }
    }

    pub fn with_registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.config.context
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut RenderCache {
        &mut self.cache
    }

    pub fn symbols(&self) -> &SymbolResolver {
        &self.symbols
    }

    /// Render `children` into `host`.
    ///
    /// Returns `None` when there is no host to render into.
    pub fn render(
        &mut self,
        children: &[ContentBlock],
        host: Option<HostComponent>,
        props: Props,
        scope: &RenderScope,
    ) -> Option<RenderedTree> {
        let host = host?;
        Some(self.render_into(host, props, children, scope))
    }

    /// Render a full content entry as one pass.
    ///
    /// Symbol slots not reached during the pass are dropped afterwards.
    pub fn render_page(&mut self, content: &Content) -> RenderedContent {
        let start = crate::util::now_millis();
        self.symbols.begin_pass();
        let rendered = self.render_content(content, &RenderScope::default());
        self.symbols.end_pass();
        tracing::debug!(
            content = content.id.as_deref().unwrap_or_default(),
            blocks = content.blocks().len(),
            pending = rendered.tree.pending_count(),
            elapsed_ms = crate::util::now_millis() - start,
            "Rendered content"
        );
        rendered
    }

    /// Render a content entry: its stylesheet plus its blocks.
    ///
    /// The content's own initial state is the base; `scope.state` overrides it.
    pub fn render_content(&mut self, content: &Content, scope: &RenderScope) -> RenderedContent {
        let css = compose_styles(content.data.css_code.as_deref(), &content.data.custom_fonts);
        let style = inject(css, self.config.style_target);

        let mut state = content.data.state.clone();
        for (key, value) in &scope.state {
            state.insert(key.clone(), value.clone());
        }
        let scope = RenderScope {
            state,
            path: scope.path.clone(),
        };

        let mut props = Props::new();
        props.insert("class".into(), Value::from("builder-blocks"));
        let tree = self.render_into(HostComponent::element("div"), props, content.blocks(), &scope);

        RenderedContent {
            id: content.id.clone(),
            state: scope.state,
            style,
            tree,
        }
    }

    fn render_into(
        &mut self,
        host: HostComponent,
        props: Props,
        children: &[ContentBlock],
        scope: &RenderScope,
    ) -> RenderedTree {
        let mut nodes = Vec::with_capacity(children.len() * 2);
        for child in children {
            nodes.push(RenderedNode::Block {
                key: format!("block-{}", child.id),
                output: self.render_block(child, scope),
            });
        }
        for child in children {
            nodes.push(RenderedNode::Style {
                key: format!("style-{}", child.id),
                css: block_css(child),
            });
        }
        RenderedTree {
            component: host,
            props,
            options: Props::new(),
            children: nodes,
        }
    }

    fn classify(&self, block: &ContentBlock) -> BlockKind {
        if block.is_symbol() {
            BlockKind::Symbol(SymbolProps::from_block(block))
        } else {
            BlockKind::Plain(self.registry.host_for(block))
        }
    }

    fn render_block(&mut self, block: &ContentBlock, scope: &RenderScope) -> BlockOutput {
        match self.classify(block) {
            BlockKind::Plain(Some(host)) => {
                let mut tree = self.render_into(host, block_props(block), &block.children, scope);
                if let Some(component) = &block.component {
                    tree.options = component.options.clone();
                }
                BlockOutput::Tree(tree)
            }
            BlockKind::Plain(None) => BlockOutput::Absent,
            BlockKind::Symbol(props) => BlockOutput::Symbol(self.render_symbol(block, &props, scope)),
        }
    }

    fn render_symbol(&mut self, block: &ContentBlock, props: &SymbolProps, scope: &RenderScope) -> SymbolOutput {
        let identity = props.slot_identity();
        let slot = scope.slot_id(&block.id, &identity);
        let resolution = self.symbols.resolve(&slot, props, &scope.state);

        let body = match resolution.decision {
            RenderDecision::Placeholder => SymbolBody::Placeholder(self.config.placeholder_text.clone()),
            RenderDecision::InlineContent(InlineRender { content, data }) => {
                let scope = RenderScope::within_slot(&slot, data);
                SymbolBody::Rendered(Box::new(self.render_content(&content, &scope)))
            }
            RenderDecision::DelegatedFetch(fetch) => {
                let known = resolution.content.or_else(|| {
                    fetch
                        .cache_key
                        .as_ref()
                        .and_then(|key| self.cached(key))
                        .cloned()
                });
                match known {
                    Some(content) => {
                        self.symbols.record_content(&slot, content.clone());
                        let scope = RenderScope::within_slot(&slot, fetch.data);
                        SymbolBody::Rendered(Box::new(self.render_content(&content, &scope)))
                    }
                    None => SymbolBody::Pending(fetch),
                }
            }
        };

        SymbolOutput {
            wrapper: symbol_wrapper(block, props),
            slot,
            identity,
            body,
        }
    }

    /// Cached content for a key. The editor always fetches fresh content.
    pub(super) fn cached(&self, key: &RenderCacheKey) -> Option<&Content> {
        if self.config.context.editing {
            return None;
        }
        let hit = self.cache.get(key);
        tracing::trace!(%key, hit = hit.is_some(), "Render cache lookup");
        hit
    }
}

/// Host attributes of a plain block.
fn block_props(block: &ContentBlock) -> Props {
    let mut props = block.properties.clone();
    let class = join_classes(&["builder-block", &block.id], props.get("class"));
    props.insert("class".into(), Value::from(class));
    props.insert("builder-id".into(), Value::from(block.id.clone()));
    props
}

fn symbol_wrapper(block: &ContentBlock, props: &SymbolProps) -> Option<SymbolWrapper> {
    if props.data_only {
        return None;
    }
    let symbol = props.symbol.as_ref();
    let inline = symbol.is_some_and(|s| s.is_inline || s.inline_content.is_some());
    let dynamic = props.dynamic || symbol.is_some_and(|s| s.is_dynamic);

    let mut attrs = block.properties.clone();
    for (key, value) in &props.attributes {
        attrs.insert(key.clone(), value.clone());
    }

    let mut classes = vec!["builder-symbol"];
    if inline {
        classes.push("builder-inline-symbol");
    }
    if dynamic {
        classes.push("builder-dynamic-symbol");
    }
    let class = join_classes(&classes, attrs.get("class"));
    attrs.insert("class".into(), Value::from(class));

    if let Some(model) = symbol.and_then(|s| s.model_name.as_deref()) {
        attrs.insert("data-model".into(), Value::from(model));
    }

    Some(SymbolWrapper {
        tag: block
            .tag_name
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "div".to_string()),
        props: attrs,
    })
}

fn join_classes(classes: &[&str], existing: Option<&Value>) -> String {
    let mut out: Vec<&str> = classes.iter().copied().filter(|c| !c.is_empty()).collect();
    if let Some(Value::String(existing)) = existing {
        out.extend(existing.split_whitespace());
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResponsiveStyles, SYMBOL_COMPONENT};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn options(value: Value) -> Props {
        value.as_object().cloned().unwrap()
    }

    fn symbol_block(id: &str, symbol: Value) -> ContentBlock {
        ContentBlock::new(id).with_component(SYMBOL_COMPONENT, options(json!({ "symbol": symbol })))
    }

    fn root() -> RenderScope {
        RenderScope::default()
    }

    #[test]
    fn test_absent_without_host() {
        let mut renderer = BlockTreeRenderer::default();
        let children = [ContentBlock::new("a")];
        assert!(renderer.render(&children, None, Props::new(), &root()).is_none());
    }

    #[test]
    fn test_blocks_then_styles() {
        let mut renderer = BlockTreeRenderer::default();
        let children = [ContentBlock::new("a"), ContentBlock::new("b")];
        let tree = renderer
            .render(&children, Some(HostComponent::element("div")), Props::new(), &root())
            .unwrap();
        assert_eq!(tree.keys(), vec!["block-a", "block-b", "style-a", "style-b"]);
    }

    #[test]
    fn test_host_props_are_kept() {
        let mut renderer = BlockTreeRenderer::default();
        let props = options(json!({"class": "outer"}));
        let tree = renderer
            .render(&[], Some(HostComponent::element("main")), props.clone(), &root())
            .unwrap();
        assert_eq!(tree.component, HostComponent::element("main"));
        assert_eq!(tree.props, props);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn test_nested_children_and_styles() {
        let mut renderer = BlockTreeRenderer::default();
        let child = ContentBlock::new("inner")
            .with_tag("span")
            .with_styles(ResponsiveStyles::large(options(json!({"color": "red"}))));
        let parent = ContentBlock::new("outer").with_tag("section").with_child(child);

        let tree = renderer
            .render(&[parent], Some(HostComponent::element("div")), Props::new(), &root())
            .unwrap();
        let RenderedNode::Block {
            output: BlockOutput::Tree(section),
            ..
        } = &tree.children[0]
        else {
            panic!("Expected a rendered section");
        };
        assert_eq!(section.component, HostComponent::element("section"));
        assert_eq!(section.props["class"], json!("builder-block outer"));
        assert_eq!(section.keys(), vec!["block-inner", "style-inner"]);
        assert_eq!(
            section.children[1],
            RenderedNode::Style {
                key: "style-inner".into(),
                css: ".inner { color: red; }".into()
            }
        );
    }

    #[test]
    fn test_unknown_component_is_absent() {
        let mut renderer = BlockTreeRenderer::default();
        let children = [ContentBlock::new("a").with_component("Carousel", Props::new())];
        let tree = renderer
            .render(&children, Some(HostComponent::element("div")), Props::new(), &root())
            .unwrap();
        assert!(matches!(
            &tree.children[0],
            RenderedNode::Block { output: BlockOutput::Absent, .. }
        ));
        assert_eq!(tree.keys(), vec!["block-a", "style-a"]);
    }

    #[test]
    fn test_component_options_carried() {
        let mut renderer = BlockTreeRenderer::default();
        let children = [ContentBlock::new("t").with_component("Text", options(json!({"text": "<b>Hi</b>"})))];
        let tree = renderer
            .render(&children, Some(HostComponent::element("div")), Props::new(), &root())
            .unwrap();
        let RenderedNode::Block {
            output: BlockOutput::Tree(text),
            ..
        } = &tree.children[0]
        else {
            panic!("Expected a rendered component");
        };
        assert_eq!(text.component, HostComponent::Component("Text".into()));
        assert_eq!(text.options["text"], json!("<b>Hi</b>"));
    }

    #[test]
    fn test_placeholder_symbol() {
        let mut renderer = BlockTreeRenderer::default();
        let children = [symbol_block("s", json!({"model": "symbol"}))];
        let tree = renderer
            .render(&children, Some(HostComponent::element("div")), Props::new(), &root())
            .unwrap();
        let RenderedNode::Block {
            output: BlockOutput::Symbol(symbol),
            ..
        } = &tree.children[0]
        else {
            panic!("Expected a symbol");
        };
        assert_eq!(symbol.identity, "symbol:no entry");
        assert!(matches!(symbol.body, SymbolBody::Placeholder(_)));
    }

    #[test]
    fn test_inline_symbol_renders_content_with_state() {
        let mut renderer = BlockTreeRenderer::default();
        let children = [symbol_block(
            "s",
            json!({
                "inline": true,
                "data": {"title": "Hi"},
                "content": {"data": {"cssCode": ".x{}", "blocks": [{"id": "in"}]}}
            }),
        )];
        let tree = renderer
            .render(&children, Some(HostComponent::element("div")), Props::new(), &root())
            .unwrap();
        let RenderedNode::Block {
            output: BlockOutput::Symbol(symbol),
            ..
        } = &tree.children[0]
        else {
            panic!("Expected a symbol");
        };
        let wrapper = symbol.wrapper.as_ref().unwrap();
        assert_eq!(wrapper.props["class"], json!("builder-symbol builder-inline-symbol"));
        let SymbolBody::Rendered(content) = &symbol.body else {
            panic!("Expected rendered content");
        };
        assert_eq!(content.style.css(), "\n.x{}\n");
        assert_eq!(content.tree.keys(), vec!["block-in", "style-in"]);
    }

    #[test]
    fn test_delegated_symbol_pending_then_cached() {
        let mut renderer = BlockTreeRenderer::new(EngineConfig {
            context: ExecutionContext::server(),
            ..Default::default()
        });
        let children = [symbol_block("s", json!({"model": "symbol", "entry": "abc"}))];
        let host = Some(HostComponent::element("div"));

        let tree = renderer.render(&children, host.clone(), Props::new(), &root()).unwrap();
        assert_eq!(tree.pending_count(), 1);

        let key = crate::symbol::cache_key(
            &crate::model::SymbolDescriptor::entry("symbol", "abc"),
            renderer.context(),
        )
        .unwrap();
        renderer
            .cache_mut()
            .insert(key, Content::from_blocks(vec![ContentBlock::new("cached")]));

        let tree = renderer.render(&children, host, Props::new(), &root()).unwrap();
        assert_eq!(tree.pending_count(), 0);
    }

    #[test]
    fn test_symbol_wrapper_classes() {
        let block = ContentBlock::new("s")
            .with_tag("section")
            .with_property("class", "hero")
            .with_component(
                SYMBOL_COMPONENT,
                options(json!({"symbol": {"model": "banner"}, "dynamic": true})),
            );
        let wrapper = symbol_wrapper(&block, &SymbolProps::from_block(&block)).unwrap();
        assert_eq!(wrapper.tag, "section");
        assert_eq!(
            wrapper.props["class"],
            json!("builder-symbol builder-dynamic-symbol hero")
        );
        assert_eq!(wrapper.props["data-model"], json!("banner"));
    }

    #[test]
    fn test_data_only_has_no_wrapper() {
        let block = ContentBlock::new("s").with_component(
            SYMBOL_COMPONENT,
            options(json!({"symbol": {"model": "banner", "entry": "x"}, "dataOnly": true})),
        );
        assert!(symbol_wrapper(&block, &SymbolProps::from_block(&block)).is_none());
    }

    #[test]
    fn test_render_page_prunes_slots() {
        let mut renderer = BlockTreeRenderer::new(EngineConfig {
            context: ExecutionContext::editing(),
            ..Default::default()
        });
        let both = Content::from_blocks(vec![
            symbol_block("a", json!({"model": "symbol", "entry": "1"})),
            symbol_block("b", json!({"model": "symbol", "entry": "2"})),
        ]);
        renderer.render_page(&both);
        assert_eq!(renderer.symbols().slot_count(), 2);

        let one = Content::from_blocks(vec![symbol_block("a", json!({"model": "symbol", "entry": "1"}))]);
        renderer.render_page(&one);
        assert_eq!(renderer.symbols().slot_count(), 1);
    }
}
