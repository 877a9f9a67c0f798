use url::Url;

/// Returns the site key of a URL: lowercase host plus explicit port
///
/// Two URLs belong to the same site when their keys are equal. Default ports
/// are already dropped by the `url` crate, so `https://example.com:443/` and
/// `https://example.com/` share a key.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use broken_links::url::site_key;
///
/// let url = Url::parse("https://Example.com/path").unwrap();
/// assert_eq!(site_key(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(site_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn site_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Checks whether `candidate` is on the same site as `root`
///
/// Only http(s) links on the root's host and port are followed by the
/// crawler. The scheme itself may differ, so an `http://` link on an
/// `https://` site is still checked.
pub fn is_same_site(root: &Url, candidate: &Url) -> bool {
    if candidate.scheme() != "http" && candidate.scheme() != "https" {
        return false;
    }

    match (site_key(root), site_key(candidate)) {
        (Some(root_key), Some(candidate_key)) => root_key == candidate_key,
        _ => false,
    }
}
