//! Firmware records and the normalizer that produces them
//!
//! Vendor steps emit loosely-typed [`RawMetadata`]. [`normalize`] is the
//! only way to obtain a [`FirmwareRecord`], and it refuses anything
//! incomplete. Deserializing a record goes through the same check.

mod normalize;
mod raw;

pub use normalize::{normalize, RejectionReason};
pub use raw::{RawMetadata, RawValue};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Field names shared by raw metadata and records
pub mod fields {
    pub const VENDOR: &str = "vendor";
    pub const DEVICE_NAME: &str = "device_name";
    pub const DEVICE_CLASS: &str = "device_class";
    pub const FIRMWARE_VERSION: &str = "firmware_version";
    pub const RELEASE_DATE: &str = "release_date";
    pub const FILE_URLS: &str = "file_urls";
}

/// Canonical date format for records on the wire
pub const RECORD_DATE_FORMAT: &str = "%d-%m-%Y";

/// A validated firmware release, ready for download hand-off
///
/// Text fields are trimmed and non-empty, and there is at least one file
/// URL. Fields are read through accessors so that holds for every value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireRecord")]
pub struct FirmwareRecord {
    vendor: String,
    device_name: String,
    device_class: String,
    firmware_version: String,
    #[serde(serialize_with = "serialize_release_date")]
    release_date: NaiveDate,
    file_urls: Vec<String>,
}

impl FirmwareRecord {
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn device_class(&self) -> &str {
        &self.device_class
    }

    pub fn firmware_version(&self) -> &str {
        &self.firmware_version
    }

    pub fn release_date(&self) -> NaiveDate {
        self.release_date
    }

    pub fn file_urls(&self) -> &[String] {
        &self.file_urls
    }

    /// Release date rendered as `dd-mm-yyyy`
    pub fn release_date_string(&self) -> String {
        self.release_date.format(RECORD_DATE_FORMAT).to_string()
    }
}

fn serialize_release_date<S: serde::Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format(RECORD_DATE_FORMAT).to_string())
}

/// A record as it appears in JSON, before it is checked
#[derive(Deserialize)]
struct WireRecord {
    vendor: String,
    device_name: String,
    device_class: String,
    firmware_version: String,
    release_date: String,
    file_urls: Vec<String>,
}

impl TryFrom<WireRecord> for FirmwareRecord {
    type Error = RejectionReason;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        normalize(
            RawMetadata::new()
                .vendor(wire.vendor)
                .device_name(wire.device_name)
                .device_class(wire.device_class)
                .firmware_version(wire.firmware_version)
                .release_date(wire.release_date)
                .file_urls(wire.file_urls),
        )
    }
}
