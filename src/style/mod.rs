//! Style assets injected alongside rendered content.
//!
//! - [`compose_styles`] builds the per-render stylesheet (content CSS plus
//!   custom font rules).
//! - [`block_css`] builds the responsive CSS emitted next to each block.
//! - [`inject`] packages CSS for the host, either as style element content or
//!   as raw markup.

mod block;
mod fonts;

use crate::context::StyleTarget;

pub use block::{MEDIUM_MAX_WIDTH, SMALL_MAX_WIDTH, block_css, kebab_case};
pub use fonts::{FontFaceRule, compose_styles, font_css, font_face_rules};

/// Assembled from parts: some template preprocessors treat any literal style
/// tag inside an embedded string as a stylesheet of their own.
const STYLE_TAG: &str = concat!("sty", "le");

/// CSS prepared for a particular host integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedStyle {
    /// Text content for a host-created style element.
    Element(String),
    /// A complete style tag to inject as raw markup.
    Markup(String),
}

impl InjectedStyle {
    /// The CSS carried by this injection, without any wrapping markup.
    pub fn css(&self) -> &str {
        match self {
            InjectedStyle::Element(css) => css,
            InjectedStyle::Markup(markup) => markup
                .strip_prefix(concat!("<", "sty", "le>"))
                .and_then(|m| m.strip_suffix(concat!("</", "sty", "le>")))
                .unwrap_or(markup),
        }
    }
}

/// Package composed CSS for the given host target.
pub fn inject(css: String, target: StyleTarget) -> InjectedStyle {
    match target {
        StyleTarget::Element => InjectedStyle::Element(css),
        StyleTarget::Markup => InjectedStyle::Markup(format!("<{STYLE_TAG}>{css}</{STYLE_TAG}>")),
    }
}
