//! ASUS: JSON support API
//!
//! The product list API yields every router in the configured series. Each
//! product's firmware list lives on one of two support APIs depending on
//! whether the model is a ROG product. The first file flagged as a release
//! is the latest firmware.

use serde::Deserialize;
use serde_json::Value;

use crate::crawler::PolitenessOverrides;
use crate::extract::html::strip_tags;
use crate::extract::{Context, TraversalOutcome, TraversalRequest, TraversalResponse, VendorModule};
use crate::record::RawMetadata;

pub const NAME: &str = "asus";

const VENDOR: &str = "asus";
const DEVICE_CLASS: &str = "Router (Home)";
const DATE_FORMAT: &str = "%Y/%m/%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsusStep {
    ProductList,
    FirmwareList,
}

/// Locations the ASUS module talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsusEndpoints {
    pub product_list: String,
    /// Firmware list API for regular models
    pub www_api: String,
    /// Firmware list API for ROG models
    pub rog_api: String,
}

impl Default for AsusEndpoints {
    fn default() -> Self {
        Self {
            product_list: "https://odinapi.asus.com/recent-data/apiv2/SeriesFilterResult?SystemCode=asus&WebsiteCode=de&ProductLevel1Code=Networking-IoT-Servers&ProductLevel2Code=Wifi-Routers&PageSize=100&PageIndex=1&CategoryName=&SeriesName=ROG-Republic-of-Gamers,ASUS-Gaming-Routers,ASUS-WiFi-Routers&SubSeriesName=&Spec=&SubSpec=&Sort=Recommend&siteID=www&sitelang=".to_string(),
            www_api: "https://www.asus.com/support/api/product.asmx/GetPDBIOS".to_string(),
            rog_api: "https://rog.asus.com/support/webapi/product/GetPDBIOS".to_string(),
        }
    }
}

pub fn module() -> VendorModule<AsusStep> {
    module_with(AsusEndpoints::default(), ["*.asus.com"])
}

/// Builds the module against custom endpoints and allowed domains
pub fn module_with<I, D>(endpoints: AsusEndpoints, allowed_domains: I) -> VendorModule<AsusStep>
where
    I: IntoIterator<Item = D>,
    D: Into<String>,
{
    let seed = TraversalRequest::new(endpoints.product_list.clone(), AsusStep::ProductList);

    VendorModule::new(NAME)
        .seed(seed)
        .allow_domains(allowed_domains)
        .politeness(PolitenessOverrides::default().obey_robots(true))
        .step(AsusStep::ProductList, move |response, ctx| {
            parse_product_list(&endpoints, response, ctx)
        })
        .step(AsusStep::FirmwareList, parse_firmware_list)
}

#[derive(Debug, Deserialize)]
struct ProductListPayload {
    #[serde(rename = "Result")]
    result: ProductListResult,
}

#[derive(Debug, Deserialize)]
struct ProductListResult {
    #[serde(rename = "ProductList", default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ProductURL")]
    product_url: String,
    #[serde(rename = "RealProductID", default)]
    real_product_id: Value,
    #[serde(rename = "ProductHashedID", default)]
    hashed_id: Value,
}

#[derive(Debug, Deserialize)]
struct FirmwarePayload {
    #[serde(rename = "Result")]
    result: FirmwareResult,
}

#[derive(Debug, Deserialize)]
struct FirmwareResult {
    #[serde(rename = "Obj", default)]
    objects: Vec<DownloadGroup>,
}

#[derive(Debug, Deserialize)]
struct DownloadGroup {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Files", default)]
    files: Vec<FirmwareFile>,
}

#[derive(Debug, Deserialize)]
struct FirmwareFile {
    #[serde(rename = "Version")]
    version: String,
    #[serde(rename = "ReleaseDate")]
    release_date: String,
    #[serde(rename = "IsRelease", default)]
    is_release: Value,
    #[serde(rename = "DownloadUrl")]
    download_url: DownloadUrl,
}

#[derive(Debug, Deserialize)]
struct DownloadUrl {
    #[serde(rename = "Global", default)]
    global: String,
}

fn parse_product_list(
    endpoints: &AsusEndpoints,
    response: &TraversalResponse,
    _ctx: &Context,
) -> TraversalOutcome<AsusStep> {
    let payload: ProductListPayload = match response.json() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!("Unreadable ASUS product list at {}: {}", response.url, e);
            return TraversalOutcome::Empty;
        }
    };

    let requests = payload
        .result
        .products
        .into_iter()
        .filter_map(|product| {
            let model = model_reference(&product.product_url)?;
            let target = firmware_list_url(
                endpoints,
                model,
                &value_text(&product.hashed_id),
                &value_text(&product.real_product_id),
            );
            Some(
                TraversalRequest::new(target, AsusStep::FirmwareList)
                    .with("device_name", strip_tags(&product.name)),
            )
        })
        .collect();

    TraversalOutcome::NewRequests(requests)
}

fn parse_firmware_list(response: &TraversalResponse, ctx: &Context) -> TraversalOutcome<AsusStep> {
    let payload: FirmwarePayload = match response.json() {
        Ok(payload) => payload,
        Err(_) => return TraversalOutcome::Empty,
    };

    let latest = payload
        .result
        .objects
        .into_iter()
        .find(|group| group.name == "Firmware")
        .and_then(|group| {
            group
                .files
                .into_iter()
                .find(|file| value_text(&file.is_release) == "1")
        });

    let firmware = match latest {
        Some(firmware) => firmware,
        None => return TraversalOutcome::Empty,
    };

    let mut raw = RawMetadata::new()
        .vendor(VENDOR)
        .device_class(DEVICE_CLASS)
        .firmware_version(firmware.version)
        .release_date(firmware.release_date)
        .date_format(DATE_FORMAT)
        .file_urls([firmware.download_url.global]);
    if let Some(name) = ctx.get_str("device_name") {
        raw = raw.device_name(name);
    }

    TraversalOutcome::Metadata(raw)
}

/// Second-to-last path segment of a product URL, e.g. `rt-ax88u` from
/// `https://www.asus.com/de/networking-iot-servers/wifi-routers/asus-wifi-routers/rt-ax88u/`
fn model_reference(product_url: &str) -> Option<&str> {
    product_url.rsplit('/').nth(1).filter(|s| !s.is_empty())
}

fn firmware_list_url(endpoints: &AsusEndpoints, model: &str, hashed_id: &str, product_id: &str) -> String {
    if model.starts_with("rog-") {
        format!(
            "{}?website=de&model={}&cpu=&pdid={}",
            endpoints.rog_api, model, product_id
        )
    } else {
        format!(
            "{}?website=de&model={}&pdhashedid={}",
            endpoints.www_api, model, hashed_id
        )
    }
}

/// Renders a JSON scalar as text; ASUS is inconsistent about strings vs numbers
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
