use crate::url::TransportClass;
use crate::UrlError;
use url::Url;

/// Query parameters that never change what a vendor page serves
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
];

/// Canonicalizes a target location for use as a dedup key
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not HTTP(S)/FTP
/// 2. Lowercase the host
/// 3. Collapse repeated slashes and dot segments in the path
/// 4. Remove trailing slash (except for root /)
/// 5. Remove fragment
/// 6. Remove tracking query parameters
/// 7. Sort remaining query parameters by key, dropping an empty query
///
/// Unlike the raw target string, two locations that differ only in these
/// respects map to the same key.
///
/// # Examples
///
/// ```
/// use firmware_crawler::url::canonical_url;
///
/// let a = canonical_url("https://EU.DLINK.com/de/products/?page=2&sort=asc#top").unwrap();
/// let b = canonical_url("https://eu.dlink.com/de//products?sort=asc&page=2&utm_source=x").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn canonical_url(target: &str) -> Result<String, UrlError> {
    let mut url = Url::parse(target).map_err(|e| UrlError::Parse(e.to_string()))?;

    if TransportClass::from_scheme(url.scheme()).is_none() {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) => {
            let host = host.to_lowercase();
            url.set_host(Some(&host))
                .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;
        }
        None => return Err(UrlError::MissingHost),
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url.to_string())
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
