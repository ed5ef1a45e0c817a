#[cfg(feature = "cli")]
pub mod cli;
pub mod storage;
pub mod toml_config;

use crate::domain::model::{
    RedactionMode, DEFAULT_BLOCK_SIZE, DEFAULT_BLUR_SIGMA, DEFAULT_FILL_COLOR,
};
use crate::utils::error::{RedactorError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};

/// Redaction mode as named on the command line and in batch files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Fill,
    Pixelate,
    Blur,
}

impl ModeKind {
    /// Builds a validated mode, using the defaults for parameters left out.
    pub fn build(
        self,
        block_size: Option<u32>,
        sigma: Option<f32>,
        color: Option<&str>,
    ) -> Result<RedactionMode> {
        let mode = match self {
            ModeKind::Fill => RedactionMode::Fill {
                color: color.map(parse_color).transpose()?.unwrap_or(DEFAULT_FILL_COLOR),
            },
            ModeKind::Pixelate => RedactionMode::Pixelate {
                block_size: block_size.unwrap_or(DEFAULT_BLOCK_SIZE),
            },
            ModeKind::Blur => RedactionMode::Blur {
                sigma: sigma.unwrap_or(DEFAULT_BLUR_SIGMA),
            },
        };
        mode.validate()?;
        Ok(mode)
    }
}

/// Parses `RRGGBB` or `RRGGBBAA`, with an optional leading `#`.
pub fn parse_color(value: &str) -> Result<[u8; 4]> {
    let hex = value.trim().trim_start_matches('#');
    let invalid = |reason: &str| RedactorError::InvalidConfigValueError {
        field: "color".to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(invalid("Expected RRGGBB or RRGGBBAA"));
    }

    let mut color = [0, 0, 0, 255];
    for (i, channel) in color.iter_mut().enumerate().take(hex.len() / 2) {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| invalid("Not a hexadecimal colour"))?;
    }
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff8000").unwrap(), [255, 128, 0, 255]);
        assert_eq!(parse_color("00000080").unwrap(), [0, 0, 0, 128]);
        assert!(parse_color("fff").is_err());
        assert!(parse_color("zzzzzz").is_err());
    }

    #[test]
    fn test_build_uses_defaults() {
        assert_eq!(
            ModeKind::Pixelate.build(None, None, None).unwrap(),
            RedactionMode::Pixelate { block_size: 10 }
        );
        assert_eq!(
            ModeKind::Fill.build(None, None, None).unwrap(),
            RedactionMode::Fill { color: [0, 0, 0, 255] }
        );
        assert!(ModeKind::Blur.build(None, Some(150.0), None).is_err());
        assert!(ModeKind::Pixelate.build(Some(0), None, None).is_err());
    }
}
