//! WASM bindings for rendering content in the browser.
//!
//! This module exposes the core functions to JavaScript via wasm-bindgen.
//! Structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::context::{EngineConfig, ExecutionContext};
use crate::hash::Fingerprint;
use crate::model::{Content, CustomFont, Props, SymbolProps};
use crate::render::{BlockTreeRenderer, html};
use crate::symbol::RenderDecision;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Compose the stylesheet for content CSS and a JSON array of custom fonts.
#[wasm_bindgen]
pub fn compose_styles(css_code: Option<String>, fonts_json: &str) -> Result<String, JsValue> {
    let fonts: Vec<CustomFont> = serde_json::from_str(fonts_json).map_err(js_error)?;
    Ok(crate::style::compose_styles(css_code.as_deref(), &fonts))
}

/// Structural fingerprint of a JSON value.
#[wasm_bindgen]
pub fn fingerprint(json: &str) -> Result<String, JsValue> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(js_error)?;
    Ok(Fingerprint::of_value(&value).to_string())
}

/// Resolve symbol options against ambient state.
///
/// Returns `{"kind": "placeholder" | "inline" | "delegated", ...}` as JSON.
#[wasm_bindgen]
pub fn resolve_symbol(props_json: &str, state_json: &str, editing: bool) -> Result<String, JsValue> {
    let props: SymbolProps = serde_json::from_str(props_json).map_err(js_error)?;
    let state: Props = serde_json::from_str(state_json).map_err(js_error)?;
    let ctx = ExecutionContext {
        editing,
        browser: true,
    };

    let decision = match crate::symbol::resolve_symbol(&props, &state, &ctx) {
        RenderDecision::Placeholder => serde_json::json!({"kind": "placeholder"}),
        RenderDecision::InlineContent(inline) => serde_json::json!({
            "kind": "inline",
            "content": inline.content,
            "data": inline.data,
        }),
        RenderDecision::DelegatedFetch(fetch) => serde_json::json!({
            "kind": "delegated",
            "fetch": fetch,
        }),
    };
    Ok(decision.to_string())
}

/// Render content JSON to HTML. Delegated symbols are left empty.
#[wasm_bindgen]
pub fn render_html(content_json: &str, config_json: Option<String>) -> Result<String, JsValue> {
    let content = Content::from_json(content_json).map_err(js_error)?;
    let config = match config_json {
        Some(json) => EngineConfig::from_json(&json).map_err(js_error)?,
        None => EngineConfig::default(),
    };
    let rendered = BlockTreeRenderer::new(config).render_page(&content);
    Ok(html::to_html(&rendered))
}
