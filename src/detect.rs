//! Image payload detection.

use crate::model::ImageSize;

/// Image container formats recognized from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG
    Png,
    /// JPEG
    Jpeg,
    /// GIF
    Gif,
    /// Windows bitmap
    Bmp,
    /// TIFF
    Tiff,
    /// WebP
    Webp,
}

impl ImageFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Webp => "webp",
        }
    }

    /// MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Webp => "image/webp",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime_type())
    }
}

const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Detect the image format from the leading bytes of a payload.
///
/// Returns `None` for empty or unrecognized data.
///
/// # Example
/// ```
/// use docfill::detect::{detect_image_format, ImageFormat};
///
/// let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
/// assert_eq!(detect_image_format(&png), Some(ImageFormat::Png));
/// assert_eq!(detect_image_format(b""), None);
/// ```
pub fn detect_image_format(data: &[u8]) -> Option<ImageFormat> {
    if data.starts_with(PNG_MAGIC) {
        return Some(ImageFormat::Png);
    }
    if data.starts_with(JPEG_MAGIC) {
        return Some(ImageFormat::Jpeg);
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some(ImageFormat::Gif);
    }
    // Little-endian or big-endian byte order mark
    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Some(ImageFormat::Tiff);
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some(ImageFormat::Webp);
    }
    if data.len() >= 14 && data.starts_with(b"BM") {
        return Some(ImageFormat::Bmp);
    }
    None
}

/// Read the pixel dimensions of an encoded image.
///
/// Only the header is decoded. Returns `None` when the format is unknown or
/// the header is unreadable.
#[cfg(feature = "intrinsic-size")]
pub fn probe_dimensions(data: &[u8]) -> Option<ImageSize> {
    let reader = image::ImageReader::new(std::io::Cursor::new(data))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok((width, height)) => Some(ImageSize::new(width, height)),
        Err(e) => {
            log::debug!("Could not read image dimensions: {}", e);
            None
        }
    }
}

/// Read the pixel dimensions of an encoded image.
///
/// Built without the `intrinsic-size` feature; always returns `None`.
#[cfg(not(feature = "intrinsic-size"))]
pub fn probe_dimensions(_data: &[u8]) -> Option<ImageSize> {
    None
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A valid 2x3 RGBA PNG.
    pub const PNG_2X3: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x08, 0x06, 0x00, 0x00, 0x00, 0xB9,
        0xEA, 0xDE, 0x81, 0x00, 0x00, 0x00, 0x11, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0xF8,
        0xCF, 0xC0, 0xF0, 0x1F, 0x84, 0x19, 0x30, 0x18, 0x00, 0xA1, 0x79, 0x0B, 0xF5, 0x4D, 0xC4,
        0x9A, 0x07, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        assert_eq!(detect_image_format(fixtures::PNG_2X3), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::Png.extension(), "png");
    }

    #[test]
    fn test_detect_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert_eq!(detect_image_format(&data), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn test_detect_gif_and_webp() {
        assert_eq!(detect_image_format(b"GIF89a\x01\x00"), Some(ImageFormat::Gif));
        assert_eq!(
            detect_image_format(b"RIFF\x00\x00\x00\x00WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(detect_image_format(b""), None);
        assert_eq!(detect_image_format(b"<svg></svg>"), None);
        assert_eq!(detect_image_format(b"BM"), None);
    }

    #[test]
    #[cfg(feature = "intrinsic-size")]
    fn test_probe_dimensions() {
        assert_eq!(
            probe_dimensions(fixtures::PNG_2X3),
            Some(ImageSize::new(2, 3))
        );
        assert_eq!(probe_dimensions(b""), None);
        assert_eq!(probe_dimensions(b"not an image"), None);
    }
}
