//! Image resources materialized for the template engine.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// Default display width for embedded images.
pub const DEFAULT_IMAGE_WIDTH: u32 = 100;

/// Default display height for embedded images.
pub const DEFAULT_IMAGE_HEIGHT: u32 = 100;

/// Display size of an embedded image, in template display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Display width
    pub width: u32,
    /// Display height
    pub height: u32,
}

impl ImageSize {
    /// Create a new size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_HEIGHT)
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for ImageSize {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `120x80`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{}'", w))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{}'", h))?;
        Ok(Self::new(width, height))
    }
}

/// An image payload written to a temporary file.
///
/// The resource owns its file: the file is deleted by [`release`](Self::release)
/// or, at the latest, when the resource is dropped.
#[derive(Debug, Serialize)]
pub struct ImageResource {
    /// Path of the temporary file
    path: PathBuf,

    /// Display size
    #[serde(flatten)]
    size: ImageSize,

    #[serde(skip)]
    file: Option<TempPath>,
}

impl ImageResource {
    pub(crate) fn new(file: TempPath, size: ImageSize) -> Self {
        Self {
            path: file.to_path_buf(),
            size,
            file: Some(file),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display size.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Display width.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Display height.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Check if the backing file has already been released.
    pub fn is_released(&self) -> bool {
        self.file.is_none()
    }

    /// Delete the backing file.
    ///
    /// Calling this more than once is a no-op, and a file that is already
    /// gone counts as deleted.
    pub fn release(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(file) => match file.close() {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
                _ => Ok(()),
            },
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_size() {
        let size = ImageSize::default();
        assert_eq!(size.width, 100);
        assert_eq!(size.height, 100);
        assert_eq!(size.to_string(), "100x100");
    }

    #[test]
    fn test_parse_size() {
        assert_eq!("120x80".parse::<ImageSize>(), Ok(ImageSize::new(120, 80)));
        assert_eq!("64X64".parse::<ImageSize>(), Ok(ImageSize::new(64, 64)));
        assert!("120".parse::<ImageSize>().is_err());
        assert!("ax10".parse::<ImageSize>().is_err());
    }

    #[test]
    fn test_release_twice() {
        let file = tempfile::NamedTempFile::new().unwrap().into_temp_path();
        let mut image = ImageResource::new(file, ImageSize::default());
        let path = image.path().to_path_buf();
        assert!(path.exists());

        image.release().unwrap();
        assert!(!path.exists());
        assert!(image.is_released());

        image.release().unwrap();
    }

    #[test]
    fn test_release_missing_file() {
        let file = tempfile::NamedTempFile::new().unwrap().into_temp_path();
        let mut image = ImageResource::new(file, ImageSize::default());
        std::fs::remove_file(image.path()).unwrap();

        assert!(image.release().is_ok());
    }

    #[test]
    fn test_drop_deletes_file() {
        let file = tempfile::NamedTempFile::new().unwrap().into_temp_path();
        let image = ImageResource::new(file, ImageSize::new(10, 20));
        let path = image.path().to_path_buf();
        drop(image);
        assert!(!path.exists());
    }
}
