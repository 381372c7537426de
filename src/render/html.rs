//! HTML host substrate.
//!
//! Serializes rendered trees to static HTML for server-side output. Keys are
//! dropped (there is nothing to reconcile), style outputs become style
//! elements and pending symbols render as their empty wrapper.
//!
//! # Example
//!
//! ```
//! use tessera::model::{Content, ContentBlock};
//! use tessera::render::{BlockTreeRenderer, html};
//!
//! let content = Content::from_blocks(vec![ContentBlock::new("a").with_tag("p")]);
//! let rendered = BlockTreeRenderer::default().render_page(&content);
//! let out = html::to_html(&rendered);
//! assert!(out.contains(r#"<p builder-id="a" class="builder-block a"></p>"#));
//! ```

use std::fmt::Write;

use serde_json::Value;

use super::registry::{HostComponent, TEXT_COMPONENT};
use super::tree::{BlockOutput, RenderedContent, RenderedNode, RenderedTree, SymbolBody, SymbolOutput};
use crate::model::Props;
use crate::style::InjectedStyle;

/// Serialize rendered content (stylesheet plus blocks).
pub fn to_html(content: &RenderedContent) -> String {
    let mut out = String::new();
    write_content(content, &mut out);
    out
}

/// Serialize a rendered tree on its own.
pub fn tree_to_html(tree: &RenderedTree) -> String {
    let mut out = String::new();
    walk_tree(tree, &mut out);
    out
}

/// Serialize rendered content as a complete HTML document.
pub fn to_html_document(content: &RenderedContent, title: &str) -> String {
    let mut doc = String::from("<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>");
    doc.push_str(&escape_html(title));
    doc.push_str("</title>\n</head>\n<body>\n");
    write_content(content, &mut doc);
    doc.push_str("\n</body>\n</html>\n");
    doc
}

/// Escape text for HTML content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

fn write_content(content: &RenderedContent, out: &mut String) {
    out.push_str("<div class=\"builder-content\"");
    if let Some(id) = &content.id {
        let _ = write!(out, " builder-content-id=\"{}\"", escape_html(id));
    }
    out.push('>');
    match &content.style {
        InjectedStyle::Element(css) => write_style(css, out),
        InjectedStyle::Markup(markup) => out.push_str(markup),
    }
    walk_tree(&content.tree, out);
    out.push_str("</div>");
}

fn write_style(css: &str, out: &mut String) {
    if css.trim().is_empty() {
        return;
    }
    // A closing tag inside the CSS would end the element early.
    out.push_str("<style>");
    out.push_str(&css.replace("</", "<\\/"));
    out.push_str("</style>");
}

fn walk_tree(tree: &RenderedTree, out: &mut String) {
    let (tag, mut attrs) = match &tree.component {
        HostComponent::Element(tag) => (element_tag(tag), tree.props.clone()),
        HostComponent::Component(name) => {
            let mut attrs = tree.props.clone();
            attrs.insert("builder-component".into(), Value::from(name.clone()));
            ("div", attrs)
        }
    };
    if matches!(&tree.component, HostComponent::Component(name) if name == TEXT_COMPONENT) {
        attrs.remove("builder-component");
        let class = match attrs.get("class") {
            Some(Value::String(existing)) => format!("{existing} builder-text"),
            _ => "builder-text".to_string(),
        };
        attrs.insert("class".into(), Value::from(class));
    }

    open_tag(tag, &attrs, out);
    if is_void(tag) {
        return;
    }

    if let HostComponent::Component(name) = &tree.component
        && name == TEXT_COMPONENT
        && let Some(Value::String(text)) = tree.options.get("text")
    {
        // Rich text authored in the editor is already HTML.
        out.push_str(text);
    }

    walk_children(&tree.children, out);
    let _ = write!(out, "</{tag}>");
}

fn walk_children(children: &[RenderedNode], out: &mut String) {
    for node in children {
        match node {
            RenderedNode::Block { output, .. } => match output {
                BlockOutput::Tree(tree) => walk_tree(tree, out),
                BlockOutput::Symbol(symbol) => walk_symbol(symbol, out),
                BlockOutput::Absent => {}
            },
            RenderedNode::Style { css, .. } => write_style(css, out),
        }
    }
}

fn walk_symbol(symbol: &SymbolOutput, out: &mut String) {
    let tag = symbol.wrapper.as_ref().map(|wrapper| {
        let tag = element_tag(&wrapper.tag);
        open_tag(tag, &wrapper.props, out);
        tag
    });

    match &symbol.body {
        SymbolBody::Placeholder(text) => {
            let _ = write!(out, "<div style=\"padding: 10px;\">{}</div>", escape_html(text));
        }
        SymbolBody::Pending(_) => {}
        SymbolBody::Rendered(content) => write_content(content, out),
    }

    if let Some(tag) = tag {
        let _ = write!(out, "</{tag}>");
    }
}

fn open_tag(tag: &str, attrs: &Props, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for (name, value) in attrs {
        if !is_attribute_name(name) {
            continue;
        }
        let value = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(true) => String::new(),
            _ => continue,
        };
        let _ = write!(out, " {}=\"{}\"", name, escape_html(&value));
    }
    out.push('>');
}

/// Tag names come from authored content; anything unusual falls back to div.
fn element_tag(tag: &str) -> &str {
    if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        tag
    } else {
        "div"
    }
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | '>' | '/' | '=' | '<'))
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta" | "source" | "track" | "wbr"
    )
}
