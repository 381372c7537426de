//! Same-origin link handling.

use url::Url;

/// Whether `href` stays on the current document's origin.
///
/// Protocol-relative (`//host/...`) and `http(s)://` links are absolute.
/// Other schemes (`mailto:`, `tel:`) are absolute too; the browser owns
/// them.
pub fn is_relative(href: &str) -> bool {
    let lower = href.trim_start().to_ascii_lowercase();
    if lower.starts_with("//") || lower.starts_with("http://") || lower.starts_with("https://") {
        return false;
    }
    Url::parse(href).is_err()
}

/// Rewrite an absolute link to the current host as path plus query.
///
/// Links to other hosts (host and port both count) and unparseable links
/// come back unchanged. The fragment is dropped.
pub fn convert_to_relative(href: &str, location: &Url) -> String {
    let Ok(target) = location.join(href) else {
        return href.to_string();
    };
    if !matches!(target.scheme(), "http" | "https")
        || target.host_str() != location.host_str()
        || target.port() != location.port()
    {
        return href.to_string();
    }
    match target.query() {
        Some(query) => format!("{}?{}", target.path(), query),
        None => target.path().to_string(),
    }
}

/// The fully qualified same-origin URL for a relative link, used for hard
/// navigations. Resolved against the current document, fragment kept.
pub fn absolute_url(relative: &str, location: &Url) -> String {
    match location.join(relative) {
        Ok(url) => url.into(),
        Err(_) => format!("{}{}", location.origin().ascii_serialization(), relative),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn location() -> Url {
        Url::parse("https://example.com/current/page?x=1").unwrap()
    }

    #[test]
    fn test_is_relative() {
        assert!(is_relative("/foo"));
        assert!(is_relative("foo/bar"));
        assert!(is_relative("?q=1"));
        assert!(!is_relative("//cdn.example.com/a"));
        assert!(!is_relative("https://example.com/a"));
        assert!(!is_relative("HTTP://example.com/a"));
        assert!(!is_relative("mailto:user@example.com"));
    }

    #[test]
    fn test_same_host_becomes_relative() {
        assert_eq!(
            convert_to_relative("https://example.com/about?ref=nav#team", &location()),
            "/about?ref=nav"
        );
        assert_eq!(convert_to_relative("//example.com/a", &location()), "/a");
    }

    #[test]
    fn test_relative_is_resolved_against_location() {
        assert_eq!(convert_to_relative("/foo", &location()), "/foo");
        assert_eq!(convert_to_relative("other", &location()), "/current/other");
    }

    #[test]
    fn test_other_host_unchanged() {
        let href = "https://other.com/about";
        assert_eq!(convert_to_relative(href, &location()), href);
        let port = "https://example.com:8443/about";
        assert_eq!(convert_to_relative(port, &location()), port);
    }

    #[test]
    fn test_non_http_schemes_unchanged() {
        assert_eq!(convert_to_relative("mailto:a@example.com", &location()), "mailto:a@example.com");
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(absolute_url("/foo?x=1", &location()), "https://example.com/foo?x=1");
        let with_port = Url::parse("http://localhost:3000/").unwrap();
        assert_eq!(absolute_url("/foo", &with_port), "http://localhost:3000/foo");
    }

    #[test]
    fn test_absolute_url_keeps_fragment() {
        assert_eq!(
            absolute_url("/docs#install", &location()),
            "https://example.com/docs#install"
        );
        assert_eq!(
            absolute_url("#faq", &location()),
            "https://example.com/current/page?x=1#faq"
        );
    }

    proptest! {
        #[test]
        fn prop_same_host_paths_become_relative(
            segments in prop::collection::vec("[a-z0-9_-]{1,8}", 1..4),
        ) {
            let path = format!("/{}", segments.join("/"));
            let href = format!("https://example.com{path}");
            let converted = convert_to_relative(&href, &location());
            prop_assert!(is_relative(&converted));
            prop_assert_eq!(converted, path);
        }

        #[test]
        fn prop_foreign_hosts_stay_absolute(
            host in "[a-z]{1,10}\\.(org|net|io)",
            path in "[a-z0-9/]{0,12}",
        ) {
            let href = format!("https://{host}/{path}");
            prop_assert!(!is_relative(&convert_to_relative(&href, &location())));
        }
    }
}
