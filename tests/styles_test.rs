//! Stylesheet composition and style injection.

use pretty_assertions::assert_eq;
use serde_json::json;

use tessera::model::{Content, CustomFont};
use tessera::render::BlockTreeRenderer;
use tessera::style::{InjectedStyle, compose_styles, font_face_rules, inject};
use tessera::{EngineConfig, StyleTarget};

fn font(value: serde_json::Value) -> CustomFont {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// Font rules
// ============================================================================

#[test]
fn test_single_file_font_yields_one_rule() {
    let fonts = vec![font(json!({"family": "Foo", "fileUrl": "https://x/f.woff2"}))];
    let css = compose_styles(Some(""), &fonts);

    assert_eq!(css.matches("@font-face").count(), 1);
    assert!(css.contains("url('https://x/f.woff2')"));
    assert!(css.contains("font-weight: 400;"));
    assert!(css.contains("local(\"Foo\")"));
}

#[test]
fn test_weight_map_ignores_non_numeric_keys() {
    let fonts = vec![font(json!({
        "family": "Foo",
        "files": {
            "regular": "https://x/f.woff2",
            "700": "https://x/f-bold.woff2",
            "italic": "https://x/i.woff2"
        }
    }))];
    let css = compose_styles(Some(""), &fonts);

    assert_eq!(css.matches("@font-face").count(), 2);
    assert!(css.contains("font-weight: 400;"));
    assert!(css.contains("font-weight: 700;"));
    assert!(!css.contains("i.woff2"));
    assert_eq!(css.matches("font-display: fallback;").count(), 2);
}

#[test]
fn test_rules_follow_font_order() {
    let fonts = vec![
        CustomFont::new("Zeta", "https://x/z.woff2"),
        CustomFont::new("Alpha", "https://x/a.woff2").with_file("700", "https://x/a-700.woff2"),
    ];
    let css = compose_styles(None, &fonts);

    let zeta = css.find("https://x/z.woff2").unwrap();
    let alpha = css.find("https://x/a.woff2").unwrap();
    let alpha_bold = css.find("https://x/a-700.woff2").unwrap();
    assert!(zeta < alpha && alpha < alpha_bold);
}

#[test]
fn test_malformed_fonts_are_skipped() {
    let fonts = vec![
        font(json!({"fileUrl": "https://x/no-family.woff2"})),
        font(json!({"family": "Foo", "fileUrl": "https://x/f.woff2", "files": {"bold": "x", "": "y"}})),
        font(json!({"family": "Nothing"})),
    ];
    let css = compose_styles(Some(".a{}"), &fonts);

    assert_eq!(css.matches("@font-face").count(), 1);
    assert!(css.contains(".a{}"));
    assert!(font_face_rules(&fonts[2]).is_empty());
}

#[test]
fn test_kind_is_appended_to_family() {
    let fonts = vec![font(json!({"family": "Foo", "kind": "serif", "fileUrl": "https://x/f.woff2"}))];
    let css = compose_styles(None, &fonts);
    assert!(css.contains("font-family: \"Foo, serif\";"));
}

// ============================================================================
// Content CSS and injection
// ============================================================================

#[test]
fn test_css_code_precedes_font_rules() {
    let css_code = ".hero { color: red; }";
    let css = compose_styles(Some(css_code), &[CustomFont::new("Foo", "https://x/f.woff2")]);
    assert!(css.starts_with(&format!("\n{css_code}\n@font-face")));
}

#[test]
fn test_markup_target_wraps_in_style_tag() {
    let css = compose_styles(Some(".a{}"), &[]);
    let injected = inject(css.clone(), StyleTarget::Markup);
    match &injected {
        InjectedStyle::Markup(markup) => {
            assert!(markup.starts_with("<style>"));
            assert!(markup.ends_with("</style>"));
        }
        other => panic!("expected markup, got {other:?}"),
    }
    assert_eq!(injected.css(), css);
}

#[test]
fn test_renderer_uses_configured_target() {
    let content = Content::from_json(r#"{"data": {"cssCode": ".a{}"}}"#).unwrap();

    let element = BlockTreeRenderer::default().render_page(&content);
    assert!(matches!(element.style, InjectedStyle::Element(_)));

    let config = EngineConfig {
        style_target: StyleTarget::Markup,
        ..Default::default()
    };
    let markup = BlockTreeRenderer::new(config).render_page(&content);
    assert!(matches!(markup.style, InjectedStyle::Markup(_)));
    assert_eq!(markup.style.css(), element.style.css());
}

#[test]
fn test_content_fonts_reach_rendered_style() {
    let content = Content::from_json(
        r#"{"data": {"customFonts": [{"family": "Foo", "fileUrl": "https://x/f.woff2"}]}}"#,
    )
    .unwrap();
    let rendered = BlockTreeRenderer::default().render_page(&content);
    assert!(rendered.style.css().contains("@font-face"));
}
