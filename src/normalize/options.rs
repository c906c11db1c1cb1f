//! Normalization options and configuration.

use crate::detect::probe_dimensions;
use crate::model::ImageSize;
use crate::resource::TempStore;
use std::collections::HashMap;
use std::path::PathBuf;

/// Default maximum nesting depth of field data.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options for normalizing field data.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Maximum nesting depth below the top-level record
    pub max_depth: usize,

    /// How image display sizes are chosen
    pub sizing: ImageSizing,

    /// Per-field display sizes, matched by field name at any depth
    pub image_sizes: HashMap<String, ImageSize>,

    /// Where image payloads are written
    pub store: TempStore,
}

impl NormalizeOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the image sizing policy.
    pub fn with_sizing(mut self, sizing: ImageSizing) -> Self {
        self.sizing = sizing;
        self
    }

    /// Use a fixed display size for every image.
    pub fn with_fixed_size(mut self, size: ImageSize) -> Self {
        self.sizing = ImageSizing::Fixed(size);
        self
    }

    /// Derive display sizes from the images' pixel dimensions.
    pub fn intrinsic_size(mut self) -> Self {
        self.sizing = ImageSizing::Intrinsic;
        self
    }

    /// Override the display size of one field.
    pub fn with_image_size(mut self, field: impl Into<String>, size: ImageSize) -> Self {
        self.image_sizes.insert(field.into(), size);
        self
    }

    /// Set the temporary file store.
    pub fn with_store(mut self, store: TempStore) -> Self {
        self.store = store;
        self
    }

    /// Write temporary images to `dir` instead of the system temp directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store = self.store.with_dir(dir);
        self
    }

    /// Resolve the display size for an image field.
    ///
    /// A per-field override wins over the sizing policy.
    pub fn image_size(&self, field: &str, bytes: &[u8]) -> ImageSize {
        if let Some(size) = self.image_sizes.get(field) {
            return *size;
        }
        match self.sizing {
            ImageSizing::Fixed(size) => size,
            ImageSizing::Intrinsic => probe_dimensions(bytes).unwrap_or_else(|| {
                log::debug!(
                    "Using default size for '{}': dimensions not readable",
                    field
                );
                ImageSize::default()
            }),
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            sizing: ImageSizing::default(),
            image_sizes: HashMap::new(),
            store: TempStore::default(),
        }
    }
}

/// How image display sizes are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSizing {
    /// Same size for every image
    Fixed(ImageSize),
    /// Pixel dimensions of the image, falling back to the default size
    Intrinsic,
}

impl Default for ImageSizing {
    fn default() -> Self {
        ImageSizing::Fixed(ImageSize::default())
    }
}
