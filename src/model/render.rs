//! Normalized field data handed to the template engine.

use super::image::ImageResource;
use chrono::NaiveDate;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::path::Path;

/// A field value ready for rendering.
///
/// Scalars borrow from the caller's [`FieldRecord`](super::FieldRecord);
/// images are replaced by temporary-file resources.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RenderValue<'a> {
    /// Plain text
    Text(&'a str),

    /// Numeric value
    Number(f64),

    /// Calendar date
    Date(NaiveDate),

    /// Image materialized on disk
    Image(ImageResource),

    /// Nested group of fields
    Record(RenderRecord<'a>),

    /// Repeating section rows
    List(Vec<RenderRecord<'a>>),
}

impl RenderValue<'_> {
    /// Get the image resource, if this is an image.
    pub fn as_image(&self) -> Option<&ImageResource> {
        match self {
            RenderValue::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Insertion-ordered record of render values.
#[derive(Debug, Default)]
pub struct RenderRecord<'a> {
    entries: Vec<(&'a str, RenderValue<'a>)>,
}

impl<'a> RenderRecord<'a> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    // Keys come from a FieldRecord, which already guarantees uniqueness.
    pub(crate) fn push(&mut self, name: &'a str, value: RenderValue<'a>) {
        self.entries.push((name, value));
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&RenderValue<'a>> {
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    /// Iterate over fields in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, (&'a str, RenderValue<'a>)> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, (&'a str, RenderValue<'a>)> {
        self.entries.iter_mut()
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect every image resource at any depth.
    pub fn images(&self) -> Vec<&ImageResource> {
        let mut found = Vec::new();
        let mut pending = vec![self];
        while let Some(record) = pending.pop() {
            for (_, value) in record.iter() {
                match value {
                    RenderValue::Image(image) => found.push(image),
                    RenderValue::Record(nested) => pending.push(nested),
                    RenderValue::List(rows) => pending.extend(rows.iter()),
                    RenderValue::Text(_) | RenderValue::Number(_) | RenderValue::Date(_) => {}
                }
            }
        }
        found
    }

    /// Paths of every image file at any depth.
    pub fn image_paths(&self) -> Vec<&Path> {
        self.images().into_iter().map(|image| image.path()).collect()
    }
}

impl Serialize for RenderRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
