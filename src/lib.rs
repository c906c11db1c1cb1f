//! # docfill
//!
//! Fill document templates with field data, including embedded images, and
//! convert the result to another format.
//!
//! Template rendering and format conversion are delegated to pluggable
//! collaborators ([`TemplateEngine`], [`FormatConverter`]). docfill prepares
//! the field data for them: image payloads are written to temporary files
//! the engine can reference, and those files are removed once rendering is
//! done, whether it succeeded or not.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docfill::{CommandConverter, CommandEngine, DocFill, FieldRecord, FieldValue};
//!
//! fn main() -> docfill::Result<()> {
//!     let template = std::fs::read("certificate.docx")?;
//!     let logo = std::fs::read("logo.png")?;
//!
//!     let data = FieldRecord::new()
//!         .with("Title", "Certificate of Completion")
//!         .with("Recipient", "John Doe")
//!         .with("Logo", FieldValue::image(logo))
//!         .with("Employees", vec![
//!             FieldRecord::new().with("ID", "001").with("Name", "Alice"),
//!             FieldRecord::new().with("ID", "002").with("Name", "Bob"),
//!         ]);
//!
//!     let docfill = DocFill::new()
//!         .with_engine(CommandEngine::new("fill-docx"))
//!         .with_converter(CommandConverter::soffice("pdf"));
//!
//!     let docx = docfill.generate(&template, &data)?;
//!     let pdf = docfill.convert(&docx, "pdf")?;
//!     std::fs::write("certificate.pdf", pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed field data**: text, numbers, dates, images, nested records and
//!   repeating sections
//! - **Scoped temporary files**: every image file is deleted when the call
//!   ends, on success and on failure
//! - **Bounded nesting**: iterative traversal with a configurable depth limit
//! - **Image sizing**: fixed size, per-field overrides, or pixel dimensions

pub mod convert;
pub mod detect;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
mod process;
pub mod resource;

// Re-export commonly used types
pub use convert::{CommandConverter, ConverterRegistry, FormatConverter};
pub use detect::{detect_image_format, probe_dimensions, ImageFormat};
pub use engine::{CommandEngine, TemplateEngine};
pub use error::{Error, Result};
pub use model::{
    FieldRecord, FieldValue, ImageResource, ImageSize, RenderRecord, RenderValue,
};
pub use normalize::{normalize, ImageSizing, NormalizeOptions};
pub use resource::{release, TempStore};

use std::path::PathBuf;
use std::sync::Arc;

/// Fill a template with field data.
///
/// Normalizes `fields`, hands the result to `engine`, then deletes the
/// temporary image files. If normalization fails the engine is not called.
/// Engine errors are returned unchanged; the temporary files are deleted
/// either way.
///
/// # Example
///
/// ```no_run
/// use docfill::{generate, CommandEngine, FieldRecord, NormalizeOptions};
///
/// let template = std::fs::read("letter.docx")?;
/// let data = FieldRecord::new().with("Name", "Jane");
/// let engine = CommandEngine::new("fill-docx");
/// let docx = generate(&engine, &template, &data, &NormalizeOptions::default())?;
/// # Ok::<(), docfill::Error>(())
/// ```
pub fn generate(
    engine: &dyn TemplateEngine,
    template: &[u8],
    fields: &FieldRecord,
    options: &NormalizeOptions,
) -> Result<Vec<u8>> {
    let mut normalized = normalize(fields, options)?;

    log::info!(
        "Rendering {} byte template with {} ({} fields, {} images)",
        template.len(),
        engine.name(),
        normalized.len(),
        normalized.images().len()
    );
    let rendered = engine.render(template, &normalized);
    release(&mut normalized);

    let rendered = rendered?;
    log::info!("Rendered {} bytes", rendered.len());
    Ok(rendered)
}

/// Builder for filling and converting documents.
///
/// # Example
///
/// ```no_run
/// use docfill::{CommandConverter, CommandEngine, DocFill, FieldRecord, ImageSize};
///
/// let docfill = DocFill::new()
///     .with_engine(CommandEngine::new("fill-docx"))
///     .with_converter(CommandConverter::soffice("pdf"))
///     .with_image_size("Logo", ImageSize::new(160, 48))
///     .with_max_depth(8);
///
/// let template = std::fs::read("invoice.docx")?;
/// let data = FieldRecord::new().with("Customer", "ACME");
/// let (docx, pdf) = docfill.generate_and_convert(&template, &data, "pdf")?;
/// # Ok::<(), docfill::Error>(())
/// ```
pub struct DocFill {
    options: NormalizeOptions,
    engine: Option<Arc<dyn TemplateEngine>>,
    converters: ConverterRegistry,
}

impl DocFill {
    /// Create a new builder with no engine and no converters.
    pub fn new() -> Self {
        Self {
            options: NormalizeOptions::default(),
            engine: None,
            converters: ConverterRegistry::new(),
        }
    }

    /// Set the template engine.
    pub fn with_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.engine = Some(Arc::new(engine));
        self
    }

    /// Set a shared template engine.
    pub fn with_shared_engine(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Register a format converter.
    pub fn with_converter(mut self, converter: impl FormatConverter + 'static) -> Self {
        self.converters.register(Arc::new(converter));
        self
    }

    /// Replace the converter registry.
    pub fn with_registry(mut self, registry: ConverterRegistry) -> Self {
        self.converters = registry;
        self
    }

    /// Replace the normalization options.
    pub fn with_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the maximum nesting depth of field data.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.options = self.options.with_max_depth(depth);
        self
    }

    /// Set the image sizing policy.
    pub fn with_image_sizing(mut self, sizing: ImageSizing) -> Self {
        self.options = self.options.with_sizing(sizing);
        self
    }

    /// Override the display size of one image field.
    pub fn with_image_size(mut self, field: impl Into<String>, size: ImageSize) -> Self {
        self.options = self.options.with_image_size(field, size);
        self
    }

    /// Write temporary images to `dir`.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options = self.options.with_temp_dir(dir);
        self
    }

    /// Name temporary images after their detected format.
    pub fn with_detected_extension(mut self, detect: bool) -> Self {
        self.options.store = self.options.store.with_detected_extension(detect);
        self
    }

    /// Normalization options in effect.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Registered converters.
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    /// Fill `template` with `fields`.
    pub fn generate(&self, template: &[u8], fields: &FieldRecord) -> Result<Vec<u8>> {
        let engine = self.engine.as_deref().ok_or(Error::NoEngine)?;
        generate(engine, template, fields, &self.options)
    }

    /// Convert a rendered document to the format identified by `ext`.
    pub fn convert(&self, document: &[u8], ext: &str) -> Result<Vec<u8>> {
        self.converters.convert(document, ext)
    }

    /// Fill `template`, then convert the result.
    ///
    /// Returns the rendered document and its converted form.
    pub fn generate_and_convert(
        &self,
        template: &[u8],
        fields: &FieldRecord,
        ext: &str,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        if !self.converters.supports(ext) {
            return Err(Error::UnsupportedFormat(ext.to_string()));
        }
        let rendered = self.generate(template, fields)?;
        let converted = self.convert(&rendered, ext)?;
        Ok((rendered, converted))
    }
}

impl Default for DocFill {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl TemplateEngine for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn render(&self, template: &[u8], fields: &RenderRecord<'_>) -> Result<Vec<u8>> {
            let mut out = template.to_vec();
            out.extend(serde_json::to_vec(fields)?);
            Ok(out)
        }
    }

    #[test]
    fn test_builder_defaults() {
        let docfill = DocFill::default();
        assert_eq!(docfill.options().max_depth, normalize::DEFAULT_MAX_DEPTH);
        assert!(docfill.converters().supported_extensions().is_empty());
    }

    #[test]
    fn test_builder_chained() {
        let docfill = DocFill::new()
            .with_max_depth(3)
            .with_image_sizing(ImageSizing::Intrinsic)
            .with_image_size("Logo", ImageSize::new(10, 20))
            .with_temp_dir("/tmp/docfill-test")
            .with_detected_extension(true);

        let options = docfill.options();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.sizing, ImageSizing::Intrinsic);
        assert_eq!(options.image_sizes["Logo"], ImageSize::new(10, 20));
        assert_eq!(options.store.dir, Some(PathBuf::from("/tmp/docfill-test")));
        assert!(options.store.detect_extension);
    }

    #[test]
    fn test_generate_without_engine() {
        let result = DocFill::new().generate(b"t", &FieldRecord::new());
        assert!(matches!(result, Err(Error::NoEngine)));
    }

    #[test]
    fn test_generate_with_engine() {
        let dir = tempfile::tempdir().unwrap();
        let docfill = DocFill::new()
            .with_engine(Echo)
            .with_temp_dir(dir.path());
        let data = FieldRecord::new().with("Name", "Jane");

        let out = docfill.generate(b"T:", &data).unwrap();
        assert_eq!(out, br#"T:{"Name":"Jane"}"#);
    }

    #[test]
    fn test_generate_and_convert_unsupported() {
        let docfill = DocFill::new().with_engine(Echo);
        let result = docfill.generate_and_convert(b"t", &FieldRecord::new(), "pdf");
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }
}
