use crate::utils::error::{RedactorError, Result};
use crate::utils::validation::{validate_path, validate_positive_number, validate_range, Validate};
use chrono::{DateTime, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BLOCK_SIZE: u32 = 10;
pub const DEFAULT_BLUR_SIGMA: f32 = 8.0;
pub const DEFAULT_FILL_COLOR: [u8; 4] = [0, 0, 0, 255];
pub const MAX_BLUR_SIGMA: f32 = 100.0;

/// Axis-aligned rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersects the region with a `width` x `height` image.
    ///
    /// Returns `None` when nothing of the region lies inside the image.
    pub fn clip(&self, width: u32, height: u32) -> Option<Region> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let right = self.x.saturating_add(self.width).min(width);
        let bottom = self.y.saturating_add(self.height).min(height);
        if right <= self.x || bottom <= self.y {
            return None;
        }
        Some(Region::new(self.x, self.y, right - self.x, bottom - self.y))
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x
            && y >= self.y
            && (x - self.x) < self.width
            && (y - self.y) < self.height
    }
}

impl std::str::FromStr for Region {
    type Err = RedactorError;

    /// Parses `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(RedactorError::InvalidConfigValueError {
                field: "region".to_string(),
                value: s.to_string(),
                reason: "Expected x,y,width,height".to_string(),
            });
        }

        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(parts) {
            *slot = part
                .parse()
                .map_err(|_| RedactorError::InvalidConfigValueError {
                    field: "region".to_string(),
                    value: s.to_string(),
                    reason: format!("'{}' is not a non-negative integer", part),
                })?;
        }

        Ok(Region::new(values[0], values[1], values[2], values[3]))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RedactionMode {
    Fill { color: [u8; 4] },
    Pixelate { block_size: u32 },
    Blur { sigma: f32 },
}

impl Default for RedactionMode {
    fn default() -> Self {
        RedactionMode::Pixelate {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl RedactionMode {
    pub fn name(&self) -> &'static str {
        match self {
            RedactionMode::Fill { .. } => "fill",
            RedactionMode::Pixelate { .. } => "pixelate",
            RedactionMode::Blur { .. } => "blur",
        }
    }
}

impl Validate for RedactionMode {
    fn validate(&self) -> Result<()> {
        match self {
            RedactionMode::Fill { .. } => Ok(()),
            RedactionMode::Pixelate { block_size } => {
                validate_positive_number("mode.block_size", *block_size, 1)
            }
            RedactionMode::Blur { sigma } => {
                if *sigma <= 0.0 {
                    return Err(RedactorError::InvalidConfigValueError {
                        field: "mode.sigma".to_string(),
                        value: sigma.to_string(),
                        reason: "Sigma must be greater than 0".to_string(),
                    });
                }
                validate_range("mode.sigma", *sigma, 0.0, MAX_BLUR_SIGMA)
            }
        }
    }
}

/// One image plus the regions to hide and how to hide them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionJob {
    pub source_image_path: String,
    pub regions: Vec<Region>,
    pub mode: RedactionMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RedactionJob {
    pub fn new(source_image_path: impl Into<String>, mode: RedactionMode) -> Self {
        Self {
            source_image_path: source_image_path.into(),
            regions: Vec::new(),
            mode,
            output_path: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.regions.push(region);
        self
    }

    pub fn with_output(mut self, output_path: impl Into<String>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    /// Output file name: the explicit target, or `redacted_<stem>.<ext>`.
    pub fn output_name(&self) -> String {
        if let Some(output) = &self.output_path {
            return output.clone();
        }

        let source = Path::new(&self.source_image_path);
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_else(|| "png".to_string());

        format!("redacted_{}.{}", stem, extension)
    }
}

impl Validate for RedactionJob {
    fn validate(&self) -> Result<()> {
        validate_path("source_image_path", &self.source_image_path)?;

        for (index, region) in self.regions.iter().enumerate() {
            if region.width == 0 || region.height == 0 {
                return Err(RedactorError::InvalidConfigValueError {
                    field: format!("regions[{}]", index),
                    value: format!(
                        "{},{},{},{}",
                        region.x, region.y, region.width, region.height
                    ),
                    reason: "Region width and height must be greater than 0".to_string(),
                });
            }
        }

        if let Some(output) = &self.output_path {
            validate_path("output_path", output)?;
        }

        self.mode.validate()
    }
}

/// Raw bytes read during the extract phase.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Node id for graph inputs, the source path for jobs.
    pub key: String,
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Output of the transform phase, waiting to be encoded and stored.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub image: DynamicImage,
    pub output_name: String,
    pub operations_applied: usize,
}
