//! Responsive CSS for individual blocks.
//!
//! `large` styles apply unconditionally; `medium` and `small` are wrapped in
//! max-width media queries so narrower breakpoints override wider ones.

use std::fmt::Write;

use serde_json::Value;

use crate::model::{ContentBlock, StyleDeclarations};

/// Upper bound (inclusive) of the medium breakpoint in CSS pixels.
pub const MEDIUM_MAX_WIDTH: u32 = 991;
/// Upper bound (inclusive) of the small breakpoint in CSS pixels.
pub const SMALL_MAX_WIDTH: u32 = 639;

/// Generate the CSS for one block's responsive styles.
///
/// Returns an empty string for blocks without styles.
pub fn block_css(block: &ContentBlock) -> String {
    let Some(styles) = &block.responsive_styles else {
        return String::new();
    };
    if block.id.is_empty() {
        return String::new();
    }

    let mut selector = String::from(".");
    if cssparser::serialize_identifier(&block.id, &mut selector).is_err() {
        return String::new();
    }

    let mut css = String::new();
    if let Some(large) = &styles.large {
        write_rule(&mut css, &selector, large, None);
    }
    if let Some(medium) = &styles.medium {
        write_rule(&mut css, &selector, medium, Some(MEDIUM_MAX_WIDTH));
    }
    if let Some(small) = &styles.small {
        write_rule(&mut css, &selector, small, Some(SMALL_MAX_WIDTH));
    }
    css
}

fn write_rule(
    css: &mut String,
    selector: &str,
    declarations: &StyleDeclarations,
    max_width: Option<u32>,
) {
    let body = declarations_css(declarations);
    if body.is_empty() {
        return;
    }
    if !css.is_empty() {
        css.push('\n');
    }
    match max_width {
        Some(width) => {
            let _ = write!(css, "@media (max-width: {width}px) {{ {selector} {{ {body} }} }}");
        }
        None => {
            let _ = write!(css, "{selector} {{ {body} }}");
        }
    }
}

/// Serialize declarations as `name: value;` pairs.
///
/// Strings and numbers are emitted; other JSON values have no CSS form and
/// are dropped.
fn declarations_css(declarations: &StyleDeclarations) -> String {
    let mut out = String::new();
    for (name, value) in declarations {
        let value = match value {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => continue,
        };
        if !out.is_empty() {
            out.push(' ');
        }
        let _ = write!(out, "{}: {};", kebab_case(name), value);
    }
    out
}

/// Convert a camelCase property name to CSS form.
///
/// Vendor prefixes written as `WebkitTransform` become `-webkit-transform`.
/// Names that already contain a dash (custom properties) are kept as is.
pub fn kebab_case(name: &str) -> String {
    if name.contains('-') {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
