//! URL resolution: turn a candidate reference into an absolute, fetchable URL.
//!
//! Two strategies are available (see [`UrlResolution`]):
//!
//! * `Rfc3986` inspects the scheme and joins relative references against the
//!   page URL, so `pic.jpg` on `http://x.test/a/b.html` becomes
//!   `http://x.test/a/pic.jpg`.
//! * `Legacy` treats any reference containing `"http"` as absolute and
//!   otherwise appends the reference to `scheme://host[:port]` verbatim.
//!   `/search?q=http` is misclassified as absolute in this mode.

use crate::config::UrlResolution;
use crate::error::ImageError;
use tracing::debug;
use url::{Position, Url};

/// The page URL with path, query and fragment stripped, e.g. `https://x.test:8080`.
///
/// No trailing slash is added; legacy resolution concatenates onto it.
pub fn base_url(page: &Url) -> &str {
    &page[..Position::BeforePath]
}

/// Whether `reference` already names an absolute URL under `mode`.
pub fn is_absolute(reference: &str, mode: UrlResolution) -> bool {
    match mode {
        UrlResolution::Legacy => reference.contains("http"),
        UrlResolution::Rfc3986 => Url::parse(reference).is_ok(),
    }
}

/// Resolve `reference` against `page`.
///
/// Absolute references are returned unchanged.
pub fn resolve(reference: &str, page: &Url, mode: UrlResolution) -> Result<String, ImageError> {
    if is_absolute(reference, mode) {
        return Ok(reference.to_string());
    }

    let resolved = match mode {
        UrlResolution::Legacy => format!("{}{}", base_url(page), reference),
        UrlResolution::Rfc3986 => page
            .join(reference)
            .map_err(|e| ImageError::FetchFailure {
                url: reference.to_string(),
                detail: format!("cannot resolve against {page}: {e}"),
            })?
            .to_string(),
    };

    debug!("Resolved '{}' → '{}'", reference, resolved);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("http://x.test/a/b.html?q=1#frag").unwrap()
    }

    #[test]
    fn base_strips_path_query_fragment() {
        assert_eq!(base_url(&page()), "http://x.test");
        let with_port = Url::parse("https://user@h.test:8443/p/q?x").unwrap();
        assert_eq!(base_url(&with_port), "https://user@h.test:8443");
    }

    #[test]
    fn rfc_relative_is_joined_against_page() {
        assert_eq!(
            resolve("pic.jpg", &page(), UrlResolution::Rfc3986).unwrap(),
            "http://x.test/a/pic.jpg"
        );
        assert_eq!(
            resolve("/foo.png", &page(), UrlResolution::Rfc3986).unwrap(),
            "http://x.test/foo.png"
        );
        assert_eq!(
            resolve("//cdn.test/x.png", &page(), UrlResolution::Rfc3986).unwrap(),
            "http://cdn.test/x.png"
        );
    }

    #[test]
    fn rfc_does_not_misclassify_http_substring() {
        assert_eq!(
            resolve("/search?q=http", &page(), UrlResolution::Rfc3986).unwrap(),
            "http://x.test/search?q=http"
        );
    }

    #[test]
    fn legacy_concatenates_onto_host() {
        assert_eq!(
            resolve("/foo.png", &page(), UrlResolution::Legacy).unwrap(),
            "http://x.test/foo.png"
        );
        assert_eq!(
            resolve("pic.jpg", &page(), UrlResolution::Legacy).unwrap(),
            "http://x.testpic.jpg"
        );
    }

    #[test]
    fn legacy_http_substring_counts_as_absolute() {
        assert_eq!(
            resolve("/search?q=http", &page(), UrlResolution::Legacy).unwrap(),
            "/search?q=http"
        );
    }

    #[test]
    fn absolute_references_are_returned_unchanged() {
        for mode in [UrlResolution::Legacy, UrlResolution::Rfc3986] {
            for r in ["https://cdn.test/A%20B.png", "http://x.test/a/../b.png"] {
                let once = resolve(r, &page(), mode).unwrap();
                assert_eq!(once, r);
                assert_eq!(resolve(&once, &page(), mode).unwrap(), once);
            }
        }
    }
}
