//! Template engine interface.
//!
//! docfill never looks inside a template. Rendering is delegated to a
//! [`TemplateEngine`], which receives the raw template bytes and the
//! normalized field data and returns the filled document.

mod command;

pub use command::CommandEngine;

use crate::error::Result;
use crate::model::RenderRecord;

/// Trait for template engines.
///
/// Implement this trait to plug in a template library or external tool.
/// Image fields arrive as [`RenderValue::Image`](crate::model::RenderValue::Image)
/// resources whose files exist for the duration of the call.
pub trait TemplateEngine: Send + Sync {
    /// Get the name of this engine.
    fn name(&self) -> &str;

    /// Fill `template` with `fields` and return the rendered document.
    ///
    /// Errors are returned to the caller of the generation call unchanged.
    fn render(&self, template: &[u8], fields: &RenderRecord<'_>) -> Result<Vec<u8>>;
}
