use chrono::NaiveDate;
use thiserror::Error;

use crate::record::{fields, FirmwareRecord, RawMetadata, RawValue, RECORD_DATE_FORMAT};

/// Why a raw metadata map did not become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("missing or blank field: {0}")]
    MissingField(&'static str),

    #[error("release date {value:?} does not match format {format:?}")]
    UnparseableDate { value: String, format: String },

    #[error("no usable entries in {0}")]
    EmptyCollection(&'static str),
}

/// Validates raw metadata and turns it into a [`FirmwareRecord`]
///
/// Every text field must be present and non-blank after trimming surrounding
/// whitespace. `release_date` must match the declared format exactly,
/// zero padding included (`%d-%m-%Y` when none is declared). `file_urls`
/// may be a single text value or a list; blank entries are dropped and at
/// least one must remain.
/// Values are otherwise kept as given.
///
/// # Examples
///
/// ```
/// use firmware_crawler::record::{normalize, RawMetadata, RejectionReason};
///
/// let raw = RawMetadata::new()
///     .vendor("DLink")
///     .device_name("DIR-842 C1")
///     .device_class("Router (Home)")
///     .firmware_version("3.13")
///     .release_date("14.02.2022")
///     .date_format("%d.%m.%Y")
///     .file_urls(["https://ftp.dlink.de/dir/dir-842/fw.zip"]);
///
/// let record = normalize(raw).unwrap();
/// assert_eq!(record.release_date_string(), "14-02-2022");
///
/// let incomplete = RawMetadata::new().vendor("DLink");
/// assert_eq!(
///     normalize(incomplete).unwrap_err(),
///     RejectionReason::MissingField("device_name")
/// );
/// ```
pub fn normalize(mut raw: RawMetadata) -> Result<FirmwareRecord, RejectionReason> {
    let vendor = take_text(&mut raw, fields::VENDOR)?;
    let device_name = take_text(&mut raw, fields::DEVICE_NAME)?;
    let device_class = take_text(&mut raw, fields::DEVICE_CLASS)?;
    let firmware_version = take_text(&mut raw, fields::FIRMWARE_VERSION)?;
    let date_text = take_text(&mut raw, fields::RELEASE_DATE)?;

    let format = raw
        .declared_date_format()
        .unwrap_or(RECORD_DATE_FORMAT)
        .to_string();
    // chrono accepts unpadded fields, so the parsed date has to render back
    // to the same text
    let release_date = match NaiveDate::parse_from_str(&date_text, &format) {
        Ok(date) if date.format(&format).to_string() == date_text => date,
        _ => {
            return Err(RejectionReason::UnparseableDate {
                value: date_text,
                format,
            })
        }
    };

    let file_urls = take_list(&mut raw, fields::FILE_URLS)?;

    Ok(FirmwareRecord {
        vendor,
        device_name,
        device_class,
        firmware_version,
        release_date,
        file_urls,
    })
}

fn take_text(raw: &mut RawMetadata, key: &'static str) -> Result<String, RejectionReason> {
    match raw.remove(key) {
        Some(RawValue::Text(value)) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(RejectionReason::MissingField(key))
            } else {
                Ok(trimmed.to_string())
            }
        }
        _ => Err(RejectionReason::MissingField(key)),
    }
}

fn take_list(raw: &mut RawMetadata, key: &'static str) -> Result<Vec<String>, RejectionReason> {
    let values = match raw.remove(key) {
        Some(RawValue::List(values)) => values,
        Some(RawValue::Text(value)) => vec![value],
        None => return Err(RejectionReason::MissingField(key)),
    };

    let kept: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    if kept.is_empty() {
        Err(RejectionReason::EmptyCollection(key))
    } else {
        Ok(kept)
    }
}
