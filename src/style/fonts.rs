//! @font-face generation for custom fonts.
//!
//! Each usable font produces a base rule at weight 400 plus one rule per
//! additional numeric weight file. Rules come out in font order, then in
//! ascending weight order, which is the enumeration order integer-like keys
//! have in the authoring system's JSON objects. Duplicate family/weight pairs
//! are allowed; the last one declared wins in CSS.

use std::fmt::{self, Write};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::model::CustomFont;

/// Characters that would end or corrupt a single-quoted CSS `url()` token.
const URL_TOKEN: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'\\');

/// One generated @font-face rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFaceRule {
    /// CSS font-family value (family, optionally followed by the generic kind).
    pub family: String,
    /// Locally installed font name tried before downloading. Base rule only.
    pub local: Option<String>,
    pub url: String,
    /// Numeric weight as written in the descriptor (`"400"`, `"700"`).
    pub weight: String,
}

impl FontFaceRule {
    /// Serialize as a CSS rule.
    pub fn to_css(&self, out: &mut String) {
        let _ = self.write_css(out);
    }

    fn write_css(&self, out: &mut String) -> fmt::Result {
        out.push_str("@font-face {\n  font-family: ");
        cssparser::serialize_string(&self.family, out)?;
        out.push_str(";\n  src: ");
        if let Some(local) = &self.local {
            out.push_str("local(");
            cssparser::serialize_string(local, out)?;
            out.push_str("), ");
        }
        write!(
            out,
            "url('{}') format('woff2');\n  font-display: fallback;\n  font-weight: {};\n}}",
            utf8_percent_encode(&self.url, URL_TOKEN),
            self.weight
        )
    }
}

/// Build the @font-face rules for one font.
///
/// A font without a family yields nothing. A font without a base file still
/// yields its numeric weight rules.
pub fn font_face_rules(font: &CustomFont) -> Vec<FontFaceRule> {
    if font.family.as_deref().is_none_or(str::is_empty) {
        tracing::debug!(?font, "Skipping custom font without a family");
        return Vec::new();
    }
    let family = font.css_family().unwrap_or_default();
    let name = family.split(',').next().unwrap_or_default().to_string();
    let base_url = font.base_url().filter(|u| !u.is_empty());

    let mut rules = Vec::new();
    match base_url {
        Some(url) if !name.is_empty() => rules.push(FontFaceRule {
            family: family.clone(),
            local: Some(name),
            url: url.to_string(),
            weight: "400".to_string(),
        }),
        _ => tracing::debug!(%family, "Custom font has no base file"),
    }

    let Some(files) = &font.files else {
        return rules;
    };

    let mut weights: Vec<(f64, &String, &String)> = files
        .iter()
        .filter_map(|(key, url)| numeric_weight(key).map(|n| (n, key, url)))
        .collect();
    weights.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (_, weight, url) in weights {
        if url.is_empty() || Some(url.as_str()) == base_url {
            continue;
        }
        rules.push(FontFaceRule {
            family: family.clone(),
            local: None,
            url: url.clone(),
            weight: weight.clone(),
        });
    }

    rules
}

/// Parse a weight key if it is a number written in canonical form.
///
/// `"700"` and `"1.5"` qualify; `"0700"`, `"7e2"`, `"+700"` and `"italic"` do not.
fn numeric_weight(key: &str) -> Option<f64> {
    let n: f64 = key.parse().ok()?;
    (n.is_finite() && n.to_string() == key).then_some(n)
}

/// Generate the @font-face CSS for a list of fonts.
pub fn font_css(fonts: &[CustomFont]) -> String {
    let mut out = String::new();
    for rule in fonts.iter().flat_map(font_face_rules) {
        if !out.is_empty() {
            out.push('\n');
        }
        rule.to_css(&mut out);
    }
    out
}

/// Compose the stylesheet for one render pass: the content's CSS verbatim,
/// followed by the generated font rules.
pub fn compose_styles(css_code: Option<&str>, fonts: &[CustomFont]) -> String {
    format!("\n{}\n{}", css_code.unwrap_or_default(), font_css(fonts))
}
