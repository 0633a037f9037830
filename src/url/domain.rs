use url::Url;

/// Extracts the lowercase host from a target location
///
/// Returns None when the location does not parse as an absolute URL or has
/// no host component.
///
/// # Examples
///
/// ```
/// use firmware_crawler::url::extract_host;
///
/// assert_eq!(extract_host("https://EU.Dlink.com/de/"), Some("eu.dlink.com".to_string()));
/// assert_eq!(extract_host("ftp://ftp.avm.de/fritzbox/"), Some("ftp.avm.de".to_string()));
/// assert_eq!(extract_host("/relative/path"), None);
/// ```
pub fn extract_host(location: &str) -> Option<String> {
    let url = Url::parse(location).ok()?;
    url.host_str().map(|h| h.to_lowercase())
}
