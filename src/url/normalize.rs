use crate::UrlError;
use url::Url;

/// Schemes that never name a fetchable document
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Canonicalizes an absolute URL string
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Host lower-casing and dot-segment removal come from the URL parser
/// itself. Nothing else is rewritten: two URLs are the same page only if
/// their canonical strings are equal.
///
/// # Examples
///
/// ```
/// use ripple_search::url::canonicalize_url;
///
/// let url = canonicalize_url("https://EXAMPLE.com/a/../b#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/b");
/// ```
pub fn canonicalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    finish(url)
}

/// Resolves an `href` found on `base` to a canonical absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel:, data: schemes
/// - empty or fragment-only hrefs (same-document anchors)
/// - hrefs that do not join against the base
/// - non-HTTP(S) URLs after resolution
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    let joined = base.join(href).ok()?;
    finish(joined).ok()
}

fn finish(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost(url.to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/dir/page.html").unwrap()
    }

    #[test]
    fn test_canonicalize_removes_fragment() {
        let result = canonicalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_canonicalize_keeps_http() {
        let result = canonicalize_url("http://example.com/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_canonicalize_lowercases_host() {
        let result = canonicalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_canonicalize_invalid_scheme() {
        let result = canonicalize_url("ftp://example.com/page");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_canonicalize_malformed_url() {
        assert!(matches!(
            canonicalize_url("not a url"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = canonicalize_url("https://example.com").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_resolve_relative_path() {
        let result = resolve_link(&base_url(), "other.html").unwrap();
        assert_eq!(result.as_str(), "https://example.com/dir/other.html");
    }

    #[test]
    fn test_resolve_root_relative() {
        let result = resolve_link(&base_url(), "/top").unwrap();
        assert_eq!(result.as_str(), "https://example.com/top");
    }

    #[test]
    fn test_resolve_parent_segments() {
        let result = resolve_link(&base_url(), "../up").unwrap();
        assert_eq!(result.as_str(), "https://example.com/up");
    }

    #[test]
    fn test_resolve_absolute_link() {
        let result = resolve_link(&base_url(), "https://other.com/x#frag").unwrap();
        assert_eq!(result.as_str(), "https://other.com/x");
    }

    #[test]
    fn test_resolve_skips_special_schemes() {
        assert!(resolve_link(&base_url(), "javascript:void(0)").is_none());
        assert!(resolve_link(&base_url(), "MAILTO:someone@example.com").is_none());
        assert!(resolve_link(&base_url(), "tel:+1234567890").is_none());
        assert!(resolve_link(&base_url(), "data:text/html,<h1>x</h1>").is_none());
        assert!(resolve_link(&base_url(), "ftp://example.com/file").is_none());
    }

    #[test]
    fn test_resolve_skips_fragment_only_and_empty() {
        assert!(resolve_link(&base_url(), "#section").is_none());
        assert!(resolve_link(&base_url(), "   ").is_none());
    }
}
