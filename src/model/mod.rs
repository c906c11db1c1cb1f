//! Field data model.
//!
//! [`FieldRecord`] is what callers hand in; [`RenderRecord`] is the
//! normalized form handed to the template engine, with every image payload
//! materialized as an [`ImageResource`] on disk.

mod field;
mod image;
mod render;

pub use field::{FieldRecord, FieldValue};
pub use image::{ImageResource, ImageSize, DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH};
pub use render::{RenderRecord, RenderValue};
