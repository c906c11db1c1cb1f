//! Caller-supplied field data.

use chrono::NaiveDate;

/// A value bound to a template placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Plain text
    Text(String),

    /// Numeric value
    Number(f64),

    /// Calendar date
    Date(NaiveDate),

    /// Encoded image payload (PNG, JPEG, ...)
    Image(Vec<u8>),

    /// Nested group of fields
    Record(FieldRecord),

    /// Repeating section, one record per row
    List(Vec<FieldRecord>),
}

impl FieldValue {
    /// Create an image value from raw bytes.
    pub fn image(bytes: Vec<u8>) -> Self {
        FieldValue::Image(bytes)
    }

    /// Check if this is an image payload.
    pub fn is_image(&self) -> bool {
        matches!(self, FieldValue::Image(_))
    }

    /// Short type name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Date(_) => "date",
            FieldValue::Image(_) => "image",
            FieldValue::Record(_) => "record",
            FieldValue::List(_) => "list",
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<FieldRecord> for FieldValue {
    fn from(value: FieldRecord) -> Self {
        FieldValue::Record(value)
    }
}

impl From<Vec<FieldRecord>> for FieldValue {
    fn from(value: Vec<FieldRecord>) -> Self {
        FieldValue::List(value)
    }
}

/// Insertion-ordered mapping from field name to value.
///
/// Field names are unique within a record. Inserting an existing name
/// replaces the value and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRecord {
    entries: Vec<(String, FieldValue)>,
}

impl FieldRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if the name existed.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Iterate over fields in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, FieldValue)> {
        self.entries.iter()
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count image payloads at any depth.
    pub fn image_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(record) = pending.pop() {
            for (_, value) in record.iter() {
                match value {
                    FieldValue::Image(_) => count += 1,
                    FieldValue::Record(nested) => pending.push(nested),
                    FieldValue::List(rows) => pending.extend(rows.iter()),
                    FieldValue::Text(_) | FieldValue::Number(_) | FieldValue::Date(_) => {}
                }
            }
        }
        count
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for FieldRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = FieldRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl<'a> IntoIterator for &'a FieldRecord {
    type Item = &'a (String, FieldValue);
    type IntoIter = std::slice::Iter<'a, (String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
