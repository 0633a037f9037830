//! HTML helpers for vendor steps
//!
//! Thin wrappers over `scraper` so steps can pull text, attributes and links
//! out of server-rendered vendor pages with CSS selectors. An invalid
//! selector simply matches nothing.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A parsed HTML page
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Returns every element matching `css`, in document order
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Returns the trimmed text of every element matching `css`
    pub fn texts(&self, css: &str) -> Vec<String> {
        self.select(css).into_iter().map(element_text).collect()
    }

    /// Returns `attr` of every element matching `css` that carries it
    pub fn attrs(&self, css: &str, attr: &str) -> Vec<String> {
        self.select(css)
            .into_iter()
            .filter_map(|el| el.value().attr(attr).map(|v| v.trim().to_string()))
            .collect()
    }

    pub fn first_text(&self, css: &str) -> Option<String> {
        self.select(css).into_iter().next().map(element_text)
    }

    /// Returns the page title, if present and non-empty
    pub fn title(&self) -> Option<String> {
        self.first_text("title").filter(|s| !s.is_empty())
    }

    /// Extracts followable links from `<a href>` tags, resolved against `base`
    ///
    /// Skipped: `download` anchors, fragment-only links, `javascript:`,
    /// `mailto:`, `tel:` and `data:` targets, and anything that does not
    /// resolve to an HTTP(S) or FTP location.
    pub fn links(&self, base: &Url) -> Vec<String> {
        self.select("a[href]")
            .into_iter()
            .filter(|el| el.value().attr("download").is_none())
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| resolve_link(href, base))
            .collect()
    }
}

/// Collapsed, trimmed text content of an element
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Returns the text of the first descendant of `element` matching `css`
pub fn child_text(element: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    element.select(&selector).next().map(element_text)
}

/// Removes markup from an HTML fragment, keeping its text
pub fn strip_tags(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base: &Url) -> Option<String> {
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

    let absolute = base.join(href).ok()?;
    match absolute.scheme() {
        "http" | "https" | "ftp" => Some(absolute.to_string()),
        _ => None,
    }
}
