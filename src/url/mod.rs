//! URL handling for the crawler
//!
//! This module resolves hrefs found on pages into absolute URLs, builds the
//! keys used to detect revisited index pages, and parses artist page URLs.

mod artist;

pub use artist::ArtistRef;

use url::Url;

/// Resolves an href found on a page to an absolute URL
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: and data: schemes
/// - hrefs that fail to resolve
/// - non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use coverage_crawler::url::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/artists/by/a/").unwrap();
/// let url = resolve_href(&base, "/artists/1-x/").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/artists/1-x/");
/// ```
pub fn resolve_href(base_url: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url)
        }
        _ => None,
    }
}

/// Key identifying a page for revisit detection
///
/// Fragments never change the fetched document, so they are dropped.
pub fn page_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/artists/by/a/").unwrap()
    }

    #[test]
    fn test_resolve_absolute_href() {
        let url = resolve_href(&base_url(), "https://other.com/page").unwrap();
        assert_eq!(url.as_str(), "https://other.com/page");
    }

    #[test]
    fn test_resolve_root_relative_href() {
        let url = resolve_href(&base_url(), "/artists/30707-todolo/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/artists/30707-todolo/");
    }

    #[test]
    fn test_resolve_path_relative_href() {
        let url = resolve_href(&base_url(), "2/").unwrap();
        assert_eq!(url.as_str(), "https://example.com/artists/by/a/2/");
    }

    #[test]
    fn test_resolve_query_only_href() {
        let url = resolve_href(&base_url(), "?page=2").unwrap();
        assert_eq!(url.as_str(), "https://example.com/artists/by/a/?page=2");
    }

    #[test]
    fn test_skip_special_schemes() {
        assert!(resolve_href(&base_url(), "javascript:void(0)").is_none());
        assert!(resolve_href(&base_url(), "mailto:test@example.com").is_none());
        assert!(resolve_href(&base_url(), "tel:+1234567890").is_none());
        assert!(resolve_href(&base_url(), "data:text/html,hi").is_none());
    }

    #[test]
    fn test_skip_empty_and_fragment_hrefs() {
        assert!(resolve_href(&base_url(), "   ").is_none());
        assert!(resolve_href(&base_url(), "#top").is_none());
    }

    #[test]
    fn test_page_key_ignores_fragment() {
        let a = Url::parse("https://example.com/artists/by/a/?page=2#list").unwrap();
        let b = Url::parse("https://example.com/artists/by/a/?page=2").unwrap();
        assert_eq!(page_key(&a), page_key(&b));
    }
}
