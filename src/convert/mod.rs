//! Format converters for rendered documents.
//!
//! A converter turns a rendered document into another format (typically
//! PDF). Converters are registered in a [`ConverterRegistry`] under the
//! extension of the format they produce.
//!
//! # Example
//!
//! ```no_run
//! use docfill::convert::{CommandConverter, ConverterRegistry};
//! use std::sync::Arc;
//!
//! fn main() -> docfill::Result<()> {
//!     let mut registry = ConverterRegistry::new();
//!     registry.register(Arc::new(CommandConverter::soffice("pdf")));
//!
//!     let docx = std::fs::read("filled.docx")?;
//!     let pdf = registry.convert(&docx, "pdf")?;
//!     std::fs::write("filled.pdf", pdf)?;
//!     Ok(())
//! }
//! ```

mod command;

pub use command::CommandConverter;

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for format converters.
///
/// Implement this trait to add support for a new output format.
pub trait FormatConverter: Send + Sync {
    /// Extension of the produced format, lowercase without the leading dot
    /// (e.g., `"pdf"`).
    fn target_extension(&self) -> &str;

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert a rendered document.
    fn convert(&self, document: &[u8]) -> Result<Vec<u8>>;

    /// Check if this converter produces the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        self.target_extension().eq_ignore_ascii_case(ext)
    }
}

/// Registry for format converters.
///
/// The registry maps output extensions to converters and dispatches
/// conversions by requested format.
#[derive(Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn FormatConverter>>,
    by_name: HashMap<String, Arc<dyn FormatConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the LibreOffice PDF converter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CommandConverter::soffice("pdf")));
        registry
    }

    /// Register a converter.
    ///
    /// A converter registered later for the same extension replaces the
    /// earlier one.
    pub fn register(&mut self, converter: Arc<dyn FormatConverter>) {
        self.converters
            .insert(converter.target_extension().to_lowercase(), converter.clone());
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by output extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn FormatConverter>> {
        self.converters.get(&normalize_ext(ext)).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn FormatConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an output extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&normalize_ext(ext))
    }

    /// Get all supported output extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.converters.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Convert a document to the format identified by `ext`.
    pub fn convert(&self, document: &[u8], ext: &str) -> Result<Vec<u8>> {
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(ext.to_string()))?;

        log::info!(
            "Converting {} bytes to {} with {}",
            document.len(),
            ext,
            converter.name()
        );
        converter.convert(document)
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}

fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}
