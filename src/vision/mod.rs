//! Pixel backend built on the `image` crate.
//!
//! Decoding and encoding live here. The per-pixel operations live in the
//! submodules: `filters` for the node editor, `geometry` for the affine warps,
//! `text` for captions and `redact` for region redaction.

pub mod filters;
pub mod geometry;
pub mod redact;
pub mod text;

use crate::domain::model::RedactionJob;
use crate::domain::ports::VisionBackend;
use crate::utils::error::{RedactorError, Result};
use image::{DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Bmp,
}

impl OutputFormat {
    pub const EXTENSIONS: [&'static str; 4] = ["png", "jpg", "jpeg", "bmp"];

    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            "bmp" => Ok(OutputFormat::Bmp),
            other => Err(RedactorError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }

    pub fn from_path(path: &str) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| RedactorError::UnsupportedFormat {
                format: format!("'{}' has no extension", path),
            })?;
        Self::from_extension(extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Bmp => "bmp",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Bmp => ImageFormat::Bmp,
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = RedactorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s)
    }
}

/// Default [`VisionBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageBackend;

impl ImageBackend {
    pub fn new() -> Self {
        Self
    }
}

impl VisionBackend for ImageBackend {
    fn decode(&self, source_name: &str, bytes: &[u8]) -> Result<DynamicImage> {
        let format = image::guess_format(bytes).map_err(|_| RedactorError::UnsupportedFormat {
            format: format!("unrecognized data in '{}'", source_name),
        })?;

        image::load_from_memory_with_format(bytes, format).map_err(|e| {
            RedactorError::UnreadableImage {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            }
        })
    }

    fn encode(&self, image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            // no alpha channel in JPEG
            OutputFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
                .write_to(&mut buffer, format.image_format())?,
            _ => image.write_to(&mut buffer, format.image_format())?,
        }
        Ok(buffer.into_inner())
    }

    fn apply_job(&self, job: &RedactionJob, image: DynamicImage) -> Result<(DynamicImage, usize)> {
        let mut canvas = image.to_rgba8();
        let mut applied = 0;

        for region in &job.regions {
            if redact::apply_region(&mut canvas, region, &job.mode) {
                applied += 1;
            } else {
                tracing::warn!(
                    "⚠️ Region {},{} {}x{} lies outside the {}x{} image, skipped",
                    region.x,
                    region.y,
                    region.width,
                    region.height,
                    canvas.width(),
                    canvas.height()
                );
            }
        }

        Ok((DynamicImage::ImageRgba8(canvas), applied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RedactionMode, Region};
    use image::{Rgba, RgbaImage};

    fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        ImageBackend
            .encode(&DynamicImage::ImageRgba8(image.clone()), OutputFormat::Png)
            .unwrap()
    }

    #[test]
    fn test_output_format_from_path() {
        assert_eq!(OutputFormat::from_path("a/b.PNG").unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path("b.jpeg").unwrap(), OutputFormat::Jpeg);
        assert!(matches!(
            OutputFormat::from_path("b.gif"),
            Err(RedactorError::UnsupportedFormat { .. })
        ));
        assert!(OutputFormat::from_path("noext").is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_bytes() {
        let err = ImageBackend.decode("notes.txt", b"hello world").unwrap_err();
        assert!(matches!(err, RedactorError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_decode_reports_truncated_png() {
        let bytes = png_bytes(&RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255])));
        let err = ImageBackend.decode("cut.png", &bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, RedactorError::UnreadableImage { .. }));
    }

    #[test]
    fn test_redact_round_trips_through_bytes() {
        let bytes = png_bytes(&RgbaImage::from_pixel(6, 6, Rgba([200, 200, 200, 255])));
        let job = RedactionJob::new("in.png", RedactionMode::Fill { color: [0, 0, 0, 255] })
            .with_region(Region::new(0, 0, 3, 3));

        let out = ImageBackend.redact(&job, &bytes, OutputFormat::Png).unwrap();
        let decoded = ImageBackend.decode("out.png", &out).unwrap().to_rgba8();

        assert_eq!(decoded.get_pixel(1, 1), &Rgba([0, 0, 0, 255]));
        assert_eq!(decoded.get_pixel(4, 4), &Rgba([200, 200, 200, 255]));
    }

    #[test]
    fn test_apply_job_counts_only_visible_regions() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(10, 10));
        let job = RedactionJob::new("in.png", RedactionMode::default())
            .with_region(Region::new(2, 2, 4, 4))
            .with_region(Region::new(50, 50, 4, 4));

        let (_, applied) = ImageBackend.apply_job(&job, image).unwrap();
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_jpeg_encoding_drops_alpha() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 128])));
        let bytes = ImageBackend.encode(&image, OutputFormat::Jpeg).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }
}
