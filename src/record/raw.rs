use std::collections::HashMap;

use crate::record::fields;

/// A value in a raw metadata map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
}

/// Untyped metadata a vendor step extracted for one firmware release
///
/// Nothing is validated here. The date format says how `release_date` is
/// written on the vendor's side; [`crate::record::normalize`] parses it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadata {
    values: HashMap<String, RawValue>,
    date_format: Option<String>,
}

impl RawMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), RawValue::Text(value.into()));
        self
    }

    pub fn list<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.values.insert(
            key.into(),
            RawValue::List(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Declares the strftime format of the `release_date` value
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    pub fn vendor(self, value: impl Into<String>) -> Self {
        self.text(fields::VENDOR, value)
    }

    pub fn device_name(self, value: impl Into<String>) -> Self {
        self.text(fields::DEVICE_NAME, value)
    }

    pub fn device_class(self, value: impl Into<String>) -> Self {
        self.text(fields::DEVICE_CLASS, value)
    }

    pub fn firmware_version(self, value: impl Into<String>) -> Self {
        self.text(fields::FIRMWARE_VERSION, value)
    }

    pub fn release_date(self, value: impl Into<String>) -> Self {
        self.text(fields::RELEASE_DATE, value)
    }

    pub fn file_urls<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.list(fields::FILE_URLS, values)
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<RawValue> {
        self.values.remove(key)
    }

    pub fn declared_date_format(&self) -> Option<&str> {
        self.date_format.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_values() {
        let raw = RawMetadata::new()
            .vendor("ASUS")
            .file_urls(["https://dlcdnets.asus.com/fw.zip"])
            .date_format("%Y/%m/%d");

        assert_eq!(raw.get("vendor"), Some(&RawValue::Text("ASUS".to_string())));
        assert_eq!(
            raw.get("file_urls"),
            Some(&RawValue::List(vec!["https://dlcdnets.asus.com/fw.zip".to_string()]))
        );
        assert_eq!(raw.declared_date_format(), Some("%Y/%m/%d"));
    }

    #[test]
    fn test_text_for_list_key_is_allowed() {
        let raw = RawMetadata::new().text("file_urls", "https://example.com/fw.bin");
        assert!(matches!(raw.get("file_urls"), Some(RawValue::Text(_))));
    }

    #[test]
    fn test_no_declared_format_by_default() {
        assert_eq!(RawMetadata::new().declared_date_format(), None);
    }
}
