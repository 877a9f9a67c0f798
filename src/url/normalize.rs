use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a URL for use as a crawl key
///
/// Normalization is intentionally light: the crawler reports the URLs that
/// pages actually link to, so nothing that changes which resource a server
/// sees is rewritten.
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Accept only `http` and `https`
/// 3. Require a host (the `url` crate lowercases it and drops default ports)
/// 4. Remove the fragment (everything after #)
/// 5. Drop an empty query string (trailing ?)
///
/// # Examples
///
/// ```
/// use broken_links::url::normalize_url;
///
/// let url = normalize_url("HTTP://Example.COM:80/docs/#intro").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/docs/");
/// ```
pub fn normalize_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL
///
/// Same rules as [`normalize_url`], for links the parser resolved itself.
pub fn normalize_parsed(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(url)
}
