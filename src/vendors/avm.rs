//! AVM: firmware directory tree
//!
//! The file server exposes JSON directory listings. Sub-folders are walked
//! recursively; each firmware image is described by the `info_de.txt` next
//! to it. Before a record is emitted, the product page on avm.de is checked
//! so that end-of-life products (whose page is gone) are skipped.

use serde::Deserialize;

use crate::crawler::PolitenessOverrides;
use crate::extract::{
    Context, ResponseStatus, StatusPolicy, TraversalOutcome, TraversalRequest, TraversalResponse,
    VendorModule,
};
use crate::record::fields::{DEVICE_NAME, FIRMWARE_VERSION, RELEASE_DATE};
use crate::record::RawMetadata;

pub const NAME: &str = "avm";

const VENDOR: &str = "AVM";
const INFO_FILE: &str = "info_de.txt";
const IMAGE_PATH: &str = "image_path";

const SKIPPED_FOLDERS: [&str; 8] = [
    "..",
    "archive",
    "beta",
    "other",
    "recover",
    "belgium",
    "tools",
    "switzerland",
];
const IMAGE_EXTENSIONS: [&str; 2] = [".image", ".zip"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvmStep {
    Directory,
    InfoFile,
    VerifySupport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvmEndpoints {
    /// Root of the directory tree
    pub file_root: String,
    /// Product pages, addressed as `{product_base}/{line}/{product}`
    pub product_base: String,
    /// Skip products whose page no longer exists
    pub verify_support: bool,
}

impl Default for AvmEndpoints {
    fn default() -> Self {
        Self {
            file_root: "ftp://ftp.avm.de/".to_string(),
            product_base: "https://avm.de/produkte".to_string(),
            verify_support: true,
        }
    }
}

pub fn module() -> VendorModule<AvmStep> {
    module_with(AvmEndpoints::default(), ["ftp.avm.de", "avm.de"])
}

pub fn module_with<I, D>(endpoints: AvmEndpoints, allowed_domains: I) -> VendorModule<AvmStep>
where
    I: IntoIterator<Item = D>,
    D: Into<String>,
{
    let gone_tolerant = StatusPolicy::success_only().also(404);
    let seed = TraversalRequest::new(endpoints.file_root.clone(), AvmStep::Directory);

    VendorModule::new(NAME)
        .seed(seed)
        .allow_domains(allowed_domains)
        .politeness(PolitenessOverrides::default().obey_robots(false))
        .step_handling(AvmStep::Directory, gone_tolerant.clone(), parse_directory)
        .step_handling(AvmStep::InfoFile, gone_tolerant.clone(), move |response, ctx| {
            parse_info_file(&endpoints, response, ctx)
        })
        .step_handling(AvmStep::VerifySupport, gone_tolerant, verify_support)
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    filename: String,
    filetype: String,
    #[serde(default)]
    linktarget: Option<String>,
}

impl ListingEntry {
    fn is_walkable_folder(&self) -> bool {
        self.filetype == "d"
            && self.linktarget.is_none()
            && !SKIPPED_FOLDERS.contains(&self.filename.as_str())
    }

    fn is_firmware_image(&self) -> bool {
        self.filetype == "-"
            && self.linktarget.is_none()
            && IMAGE_EXTENSIONS.iter().any(|ext| self.filename.ends_with(ext))
    }
}

fn parse_directory(response: &TraversalResponse, _ctx: &Context) -> TraversalOutcome<AvmStep> {
    if !response.status.is_success() {
        return TraversalOutcome::Empty;
    }

    let entries: Vec<ListingEntry> = match response.json() {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Unreadable listing at {}: {}", response.url, e);
            return TraversalOutcome::Empty;
        }
    };

    let base = &response.url;
    let folders = entries
        .iter()
        .filter(|entry| entry.is_walkable_folder())
        .map(|entry| {
            let target = format!("{}/", child_path(base, &entry.filename));
            TraversalRequest::new(target, AvmStep::Directory)
        });
    let images = entries
        .iter()
        .filter(|entry| entry.is_firmware_image())
        .map(|entry| {
            TraversalRequest::new(child_path(base, INFO_FILE), AvmStep::InfoFile)
                .with(IMAGE_PATH, child_path(base, &entry.filename))
        });

    TraversalOutcome::NewRequests(folders.chain(images).collect())
}

fn parse_info_file(
    endpoints: &AvmEndpoints,
    response: &TraversalResponse,
    ctx: &Context,
) -> TraversalOutcome<AvmStep> {
    if !response.status.is_success() {
        return TraversalOutcome::Empty;
    }
    let image_path = match ctx.get_str(IMAGE_PATH) {
        Some(path) => path.to_string(),
        None => return TraversalOutcome::Empty,
    };

    let mut details = ctx.clone();
    let info = InfoFields::parse(&response.latin1());
    if let Some(name) = info.product {
        details.insert(DEVICE_NAME, name);
    }
    if let Some(version) = info.version {
        details.insert(FIRMWARE_VERSION, version);
    }
    if let Some(date) = info.release_date {
        details.insert(RELEASE_DATE, date);
    }

    let product_url = if endpoints.verify_support {
        product_page(&endpoints.product_base, &image_path)
    } else {
        None
    };

    match product_url {
        // Locales of one product share a product page; each image gets its
        // own check.
        Some(url) => TraversalOutcome::NewRequests(vec![TraversalRequest::new(
            url.clone(),
            AvmStep::VerifySupport,
        )
        .with_dedup_key(format!("{}#{}", url, image_path))
        .with_context(details)]),
        None => TraversalOutcome::Metadata(metadata_from(&details)),
    }
}

/// Emits the carried record only if the product page still exists
fn verify_support(response: &TraversalResponse, ctx: &Context) -> TraversalOutcome<AvmStep> {
    match response.status {
        ResponseStatus::Code(200) => TraversalOutcome::Metadata(metadata_from(ctx)),
        _ => {
            tracing::debug!("Skipping end-of-life product at {}", response.url);
            TraversalOutcome::Empty
        }
    }
}

/// Builds raw metadata from the fields carried in a request context
///
/// Missing info fields stay missing so the normalizer rejects the record.
fn metadata_from(ctx: &Context) -> RawMetadata {
    let mut metadata = RawMetadata::new().vendor(VENDOR);
    if let Some(image_path) = ctx.get_str(IMAGE_PATH) {
        metadata = metadata
            .device_class(device_class(image_path))
            .file_urls([image_path]);
    }
    for key in [DEVICE_NAME, FIRMWARE_VERSION, RELEASE_DATE] {
        if let Some(value) = ctx.get_str(key) {
            metadata = metadata.text(key, value);
        }
    }
    metadata
}

/// Fields read from an `info_de.txt`
#[derive(Debug, Default, PartialEq, Eq)]
struct InfoFields {
    product: Option<String>,
    version: Option<String>,
    release_date: Option<String>,
}

impl InfoFields {
    /// Reads `Key : value` lines; the first occurrence of each key wins
    fn parse(text: &str) -> Self {
        let mut fields = Self::default();
        for line in text.lines() {
            let (key, value) = match line.split_once(':') {
                Some(pair) => pair,
                None => continue,
            };
            let key = key.trim();
            let value = value.trim();
            if value.is_empty() || key.contains(char::is_whitespace) {
                continue;
            }

            if key.eq_ignore_ascii_case("Produkt") {
                fields.product.get_or_insert_with(|| value.to_string());
            } else if key.eq_ignore_ascii_case("Version") {
                let last = value.split(' ').last().unwrap_or(value);
                fields.version.get_or_insert_with(|| last.to_string());
            } else if key.eq_ignore_ascii_case("Release-Datum") {
                fields
                    .release_date
                    .get_or_insert_with(|| value.replace(['.', '/'], "-"));
            }
        }
        fields
    }
}

/// Joins a listing entry onto the listing's location
fn child_path(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, name)
    } else {
        format!("{}/{}", base, name)
    }
}

/// Path segments of an image, counted from its end:
/// `.../<line>/<product>/<locale>/fritz.os/<image>`
fn segment_from_end(image_path: &str, n: usize) -> Option<&str> {
    image_path.rsplit('/').nth(n).filter(|s| !s.is_empty())
}

fn product_page(product_base: &str, image_path: &str) -> Option<String> {
    let line = segment_from_end(image_path, 4)?;
    let product = segment_from_end(image_path, 3)?;
    Some(format!(
        "{}/{}/{}",
        product_base.trim_end_matches('/'),
        line,
        product
    ))
}

pub fn device_class(image_path: &str) -> &'static str {
    let product = segment_from_end(image_path, 3).unwrap_or_default();
    if product.starts_with("fritzrepeater") || product.starts_with("fritzwlan-repeater") {
        "Repeater"
    } else if product.starts_with("fritzwlan-usb") {
        "Wifi-Stick"
    } else if product.starts_with("fritzpowerline") {
        "PLC Adapter"
    } else {
        "Router"
    }
}
