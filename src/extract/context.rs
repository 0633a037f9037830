use std::collections::BTreeMap;

/// A single value carried in a request's context bag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Key/value data an extractor threads from one step to the next
///
/// The engine never inspects the bag; it is echoed back on the response and
/// handed to the step that processes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, ContextValue>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Context::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    /// Returns a text value, or None if absent or of another kind
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ContextValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(ContextValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(ContextValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let ctx = Context::new()
            .with("device_name", "DIR-842")
            .with("depth", 3i64)
            .with("verified", true);

        assert_eq!(ctx.get_str("device_name"), Some("DIR-842"));
        assert_eq!(ctx.get_int("depth"), Some(3));
        assert_eq!(ctx.get_bool("verified"), Some(true));
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn test_getter_kind_mismatch() {
        let ctx = Context::new().with("depth", 3i64);
        assert_eq!(ctx.get_str("depth"), None);
        assert_eq!(ctx.get_bool("depth"), None);
    }

    #[test]
    fn test_missing_key() {
        let ctx = Context::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.get("anything"), None);
        assert!(!ctx.contains_key("anything"));
    }

    #[test]
    fn test_insert_overwrites() {
        let mut ctx = Context::new().with("revision", "A1");
        ctx.insert("revision", "B1");
        assert_eq!(ctx.get_str("revision"), Some("B1"));
        assert_eq!(ctx.len(), 1);
    }
}
