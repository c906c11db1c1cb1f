//! Temporary files backing image fields.
//!
//! [`TempStore`] writes each image payload to its own uniquely named file;
//! [`release`] deletes every file referenced by a normalized record. Files
//! are also deleted when their [`ImageResource`] is dropped, so an error
//! anywhere in a generation call never leaves files behind.

use crate::detect::detect_image_format;
use crate::error::Result;
use crate::model::{ImageResource, ImageSize, RenderRecord, RenderValue};
use std::io::Write;
use std::path::PathBuf;

/// Default file name prefix for materialized images.
pub const DEFAULT_PREFIX: &str = "docfill-";

/// Default file extension for materialized images.
pub const DEFAULT_EXTENSION: &str = "png";

const RANDOM_SUFFIX_LEN: usize = 12;

/// Allocates temporary image files.
#[derive(Debug, Clone)]
pub struct TempStore {
    /// Directory for temporary files (system temp dir if `None`)
    pub dir: Option<PathBuf>,

    /// File name prefix
    pub prefix: String,

    /// Extension used when detection is off or inconclusive
    pub extension: String,

    /// Pick the extension from the payload's magic bytes
    pub detect_extension: bool,
}

impl TempStore {
    /// Create a store writing to the system temporary directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory for temporary files.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Set the file name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the fallback file extension (without the leading dot).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Enable or disable extension detection from payload bytes.
    pub fn with_detected_extension(mut self, detect: bool) -> Self {
        self.detect_extension = detect;
        self
    }

    /// The directory new files are created in.
    pub fn directory(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Write `bytes` to a new temporary file.
    ///
    /// An empty payload produces a zero-length file. Fails with
    /// [`Error::Io`](crate::Error::Io) when the directory is not writable or
    /// the disk is full.
    pub fn materialize(&self, bytes: &[u8], size: ImageSize) -> Result<ImageResource> {
        let extension = self.extension_for(bytes);
        let suffix = format!(".{}", extension);
        let mut file = tempfile::Builder::new()
            .prefix(&self.prefix)
            .suffix(&suffix)
            .rand_bytes(RANDOM_SUFFIX_LEN)
            .tempfile_in(self.directory())?;

        file.write_all(bytes)?;
        file.flush()?;

        let path = file.into_temp_path();
        log::debug!(
            "Materialized {} byte image at {}",
            bytes.len(),
            path.display()
        );
        Ok(ImageResource::new(path, size))
    }

    fn extension_for(&self, bytes: &[u8]) -> &str {
        if self.detect_extension {
            if let Some(format) = detect_image_format(bytes) {
                return format.extension();
            }
        }
        &self.extension
    }
}

impl Default for TempStore {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            detect_extension: false,
        }
    }
}

/// Delete every image file referenced by a normalized record.
///
/// Safe to call repeatedly. Files that are already gone are skipped; other
/// deletion failures are logged and ignored, since the rendered document no
/// longer depends on them.
pub fn release(record: &mut RenderRecord<'_>) {
    let mut released = 0usize;
    let mut pending = vec![record];

    while let Some(record) = pending.pop() {
        for (name, value) in record.iter_mut() {
            match value {
                RenderValue::Image(image) => {
                    if image.is_released() {
                        continue;
                    }
                    if let Err(e) = image.release() {
                        log::warn!(
                            "Failed to delete temporary image for '{}' at {}: {}",
                            name,
                            image.path().display(),
                            e
                        );
                    }
                    released += 1;
                }
                RenderValue::Record(nested) => pending.push(nested),
                RenderValue::List(rows) => pending.extend(rows.iter_mut()),
                RenderValue::Text(_) | RenderValue::Number(_) | RenderValue::Date(_) => {}
            }
        }
    }

    log::debug!("Released {} temporary images", released);
}

/// Check whether any file referenced by the record still exists.
pub fn any_exists(record: &RenderRecord<'_>) -> bool {
    record.image_paths().iter().any(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::fixtures::PNG_2X3;
    use std::path::Path;

    #[test]
    fn test_materialize_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new().with_dir(dir.path());

        let image = store
            .materialize(b"payload", ImageSize::default())
            .unwrap();

        assert_eq!(std::fs::read(image.path()).unwrap(), b"payload");
        assert_eq!(image.path().parent(), Some(dir.path()));
        assert_eq!(image.size(), ImageSize::new(100, 100));

        let name = image.path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("docfill-"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_materialize_empty_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new().with_dir(dir.path());

        let mut image = store.materialize(&[], ImageSize::default()).unwrap();
        assert_eq!(std::fs::metadata(image.path()).unwrap().len(), 0);

        image.release().unwrap();
        assert!(!image.path().exists());
    }

    #[test]
    fn test_materialize_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new().with_dir(dir.path());

        let a = store.materialize(b"a", ImageSize::default()).unwrap();
        let b = store.materialize(b"a", ImageSize::default()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_materialize_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new().with_dir(dir.path().join("does-not-exist"));

        let result = store.materialize(b"x", ImageSize::default());
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_detected_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new()
            .with_dir(dir.path())
            .with_extension("img")
            .with_detected_extension(true);

        let png = store.materialize(PNG_2X3, ImageSize::default()).unwrap();
        assert_eq!(png.path().extension().unwrap(), "png");

        let jpeg = store
            .materialize(&[0xFF, 0xD8, 0xFF, 0xE0], ImageSize::default())
            .unwrap();
        assert_eq!(jpeg.path().extension().unwrap(), "jpg");

        let unknown = store.materialize(b"???", ImageSize::default()).unwrap();
        assert_eq!(unknown.path().extension().unwrap(), "img");
    }

    #[test]
    fn test_release_nested_and_twice() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new().with_dir(dir.path());
        let image = |bytes: &[u8]| {
            RenderValue::Image(store.materialize(bytes, ImageSize::default()).unwrap())
        };

        let mut row = RenderRecord::default();
        row.push("Photo", image(b"row"));
        let mut nested = RenderRecord::default();
        nested.push("Seal", image(b"seal"));

        let mut record = RenderRecord::default();
        record.push("Logo", image(b"logo"));
        record.push("Rows", RenderValue::List(vec![row]));
        record.push("Footer", RenderValue::Record(nested));

        let paths: Vec<PathBuf> = record
            .image_paths()
            .into_iter()
            .map(Path::to_path_buf)
            .collect();
        assert_eq!(paths.len(), 3);
        assert!(any_exists(&record));

        release(&mut record);
        assert!(paths.iter().all(|p| !p.exists()));
        assert!(!any_exists(&record));

        release(&mut record);
    }

    #[test]
    fn test_release_after_external_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = TempStore::new().with_dir(dir.path());

        let mut record = RenderRecord::default();
        record.push(
            "Logo",
            RenderValue::Image(store.materialize(b"x", ImageSize::default()).unwrap()),
        );
        for path in record.image_paths() {
            std::fs::remove_file(path).unwrap();
        }

        release(&mut record);
        assert!(record.get("Logo").unwrap().as_image().unwrap().is_released());
    }
}
