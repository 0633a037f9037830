//! D-Link: server-rendered product pages
//!
//! Category pages list products; each product page carries a revision
//! selector and a firmware table for the selected revision. A product page
//! fetched without a revision is re-requested for its newest revision.

use crate::crawler::PolitenessOverrides;
use crate::extract::html::{child_text, Document};
use crate::extract::{
    Context, StatusPolicy, TraversalOutcome, TraversalRequest, TraversalResponse, VendorModule,
    UNKNOWN_DEVICE_CLASS,
};
use crate::record::RawMetadata;

pub const NAME: &str = "dlink";

const VENDOR: &str = "DLink";
const DATE_FORMAT: &str = "%d.%m.%Y";
const CATEGORIES: [&str; 4] = ["wifi", "cameras", "smart-home", "switches"];

const PRODUCT_NAME: &str = "product_name";
const PRODUCT_REVISION: &str = "product_revision";

/// Ordered model-prefix table; the first key found in the lowercased
/// download link decides the class
const DEVICE_CLASSES: &[(&[&str], &str)] = &[
    (&["dba", "dap"], "Access Point"),
    (&["dis", "dmc"], "Converter"),
    (&["dge", "dwa", "dxe"], "PCIe-Networkcard"),
    (&["dps"], "Redundant Power Supply"),
    (&["dsr"], "Router (Business)"),
    (&["dwr", "dwm"], "Router (mobile)"),
    (&["dsl"], "Router (Modem)"),
    (&["covr", "dir", "dva", "go"], "Router (Home)"),
    (&["dsp"], "Smart Plug"),
    (&["dcs", "dsh"], "Smart Wi-Fi Camera"),
    (&["des", "dgs", "dkvm", "dqs", "dxs"], "Switch"),
    (&["dem"], "Transceiver"),
    (&["dub"], "USB Extensions"),
    (&["dnr"], "Video Recorder"),
    (&["dwc"], "Wireless Controller"),
    (&["dwl"], "other"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DLinkStep {
    Category,
    Detail,
}

pub fn module() -> VendorModule<DLinkStep> {
    let seeds = CATEGORIES.iter().map(|category| {
        format!(
            "https://eu.dlink.com/de/de/for-home/{}?mode=ajax&filters=&categories=&page=-1&target=products",
            category
        )
    });
    build(seeds, ["eu.dlink.com", "ftp.dlink.de"])
}

/// Builds the module over custom category pages and allowed domains
pub fn build<I, T, A, D>(category_pages: I, allowed_domains: A) -> VendorModule<DLinkStep>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
    A: IntoIterator<Item = D>,
    D: Into<String>,
{
    category_pages
        .into_iter()
        .fold(VendorModule::new(NAME), |module, page| {
            module.seed(TraversalRequest::new(page, DLinkStep::Category))
        })
        .allow_domains(allowed_domains)
        .politeness(PolitenessOverrides::default().obey_robots(false))
        .step(DLinkStep::Category, parse_category)
        .step_handling(
            DLinkStep::Detail,
            StatusPolicy::success_only().also(404),
            parse_detail,
        )
}

fn parse_category(response: &TraversalResponse, _ctx: &Context) -> TraversalOutcome<DLinkStep> {
    let doc = Document::parse(&response.text());

    let requests = doc
        .select("a[href]")
        .into_iter()
        .filter_map(|anchor| {
            let name = child_text(anchor, ".product-item__number").filter(|n| !n.is_empty())?;
            let target = response.urljoin(anchor.value().attr("href")?)?;
            Some(TraversalRequest::new(target, DLinkStep::Detail).with(PRODUCT_NAME, name))
        })
        .collect();

    TraversalOutcome::NewRequests(requests)
}

fn parse_detail(response: &TraversalResponse, ctx: &Context) -> TraversalOutcome<DLinkStep> {
    if !response.status.is_success() {
        tracing::debug!("Product page {} is gone ({})", response.url, response.status);
        return TraversalOutcome::Empty;
    }

    let doc = Document::parse(&response.text());

    // Products without a revision selector list their firmware directly
    let revision = match ctx.get_str(PRODUCT_REVISION) {
        Some(revision) => revision.to_string(),
        None => match request_latest_revision(&doc, response, ctx) {
            Some(outcome) => return outcome,
            None => String::new(),
        },
    };

    let version = doc.first_text(r#"div#firmware td[data-table-header="Version"]"#);
    let date = doc.first_text(r#"div#firmware td[data-table-header="Datum"]"#);
    let link = doc
        .attrs(r#"div#firmware td[data-table-header=""] a"#, "href")
        .into_iter()
        .next();

    let (version, date, link) = match (version, date, link) {
        (Some(version), Some(date), Some(link)) => (version, date, link),
        _ => return TraversalOutcome::Empty,
    };
    let link = response.urljoin(&link).unwrap_or(link);

    let name = ctx.get_str(PRODUCT_NAME).unwrap_or_default();
    let device_name = format!("{} {}", name, revision).trim().to_string();

    TraversalOutcome::Metadata(
        RawMetadata::new()
            .vendor(VENDOR)
            .device_name(device_name)
            .device_class(device_class(&link))
            .firmware_version(version)
            .release_date(date)
            .date_format(DATE_FORMAT)
            .file_urls([link]),
    )
}

/// Re-requests the page for the last entry of the revision selector
///
/// Returns `None` when the page has no revision selector.
fn request_latest_revision(
    doc: &Document,
    response: &TraversalResponse,
    ctx: &Context,
) -> Option<TraversalOutcome<DLinkStep>> {
    let latest = doc.select("select#supportRevision option").into_iter().last()?;
    let label = latest.text().collect::<String>().trim().to_string();
    let value = latest.value().attr("value").unwrap_or_default();

    let outcome = match response.urljoin(&format!("?revision={}", value)) {
        Some(target) => TraversalOutcome::NewRequests(vec![TraversalRequest::new(
            target,
            DLinkStep::Detail,
        )
        .with_context(ctx.clone().with(PRODUCT_REVISION, label))]),
        None => TraversalOutcome::Empty,
    };
    Some(outcome)
}

/// Maps a firmware download link to a device class by model prefix
pub fn device_class(download_link: &str) -> &'static str {
    let link = download_link.to_lowercase();
    DEVICE_CLASSES
        .iter()
        .find(|(keys, _)| keys.iter().any(|key| link.contains(key)))
        .map_or(UNKNOWN_DEVICE_CLASS, |&(_, class)| class)
}
