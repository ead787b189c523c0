use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// CSS pixels per inch, the ratio the engine lays pages out with.
pub const CSS_PX_PER_INCH: f64 = 96.0;

/// Paper dimensions in inches, the unit `Page.printToPDF` takes natively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperSize {
    pub width_inches: f64,
    pub height_inches: f64,
}

impl Default for PaperSize {
    fn default() -> Self {
        Self {
            width_inches: 8.5,
            height_inches: 11.0,
        }
    }
}

impl PaperSize {
    /// Layout viewport for this paper size. The only inch-to-pixel conversion
    /// in the render path.
    pub fn viewport(&self) -> ViewportSpec {
        ViewportSpec::new(
            inches_to_css_px(self.width_inches),
            inches_to_css_px(self.height_inches),
        )
    }
}

fn inches_to_css_px(inches: f64) -> u32 {
    (inches * CSS_PX_PER_INCH).round().max(1.0) as u32
}

/// Device-metrics override applied to a session before navigation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportSpec {
    pub width: u32,
    pub height: u32,
    /// `0` lets the engine pick ("auto").
    pub device_scale_factor: f64,
    pub mobile: bool,
    pub fit_window: bool,
}

impl ViewportSpec {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            device_scale_factor: 0.0,
            mobile: false,
            fit_window: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum PaperSizeParseError {
    #[error("Invalid paper size format: expected WIDTHxHEIGHT in inches (e.g., 8.5x11)")]
    InvalidFormat,
    #[error("Invalid width: {0}")]
    InvalidWidth(String),
    #[error("Invalid height: {0}")]
    InvalidHeight(String),
    #[error("Width must be positive")]
    NonPositiveWidth,
    #[error("Height must be positive")]
    NonPositiveHeight,
}

impl FromStr for PaperSize {
    type Err = PaperSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            return Err(PaperSizeParseError::InvalidFormat);
        }

        let width: f64 = parts[0]
            .trim()
            .parse()
            .map_err(|_| PaperSizeParseError::InvalidWidth(parts[0].to_string()))?;

        let height: f64 = parts[1]
            .trim()
            .parse()
            .map_err(|_| PaperSizeParseError::InvalidHeight(parts[1].to_string()))?;

        if !(width.is_finite() && width > 0.0) {
            return Err(PaperSizeParseError::NonPositiveWidth);
        }
        if !(height.is_finite() && height > 0.0) {
            return Err(PaperSizeParseError::NonPositiveHeight);
        }

        Ok(PaperSize {
            width_inches: width,
            height_inches: height,
        })
    }
}

impl std::fmt::Display for PaperSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width_inches, self.height_inches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let paper: PaperSize = "8.5x11".parse().unwrap();
        assert_eq!(paper.width_inches, 8.5);
        assert_eq!(paper.height_inches, 11.0);
    }

    #[test]
    fn test_parse_with_spaces() {
        let paper: PaperSize = " 8.27 x 11.69 ".parse().unwrap();
        assert_eq!(paper.width_inches, 8.27);
        assert_eq!(paper.height_inches, 11.69);
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!("8.5".parse::<PaperSize>().is_err());
        assert!("8.5x11x2".parse::<PaperSize>().is_err());
        assert!("x11".parse::<PaperSize>().is_err());
    }

    #[test]
    fn test_parse_non_positive() {
        assert!("0x11".parse::<PaperSize>().is_err());
        assert!("8.5x-1".parse::<PaperSize>().is_err());
        assert!("NaNx11".parse::<PaperSize>().is_err());
    }

    #[test]
    fn test_default_is_us_letter() {
        assert_eq!(PaperSize::default().to_string(), "8.5x11");
    }

    #[test]
    fn letter_maps_to_816_by_1056_css_px() {
        let spec = PaperSize::default().viewport();
        assert_eq!(spec.width, 816);
        assert_eq!(spec.height, 1056);
        assert_eq!(spec.device_scale_factor, 0.0);
        assert!(!spec.mobile);
        assert!(!spec.fit_window);
    }

    #[test]
    fn tiny_paper_keeps_a_one_pixel_viewport() {
        let spec = PaperSize {
            width_inches: 0.001,
            height_inches: 0.001,
        }
        .viewport();
        assert_eq!((spec.width, spec.height), (1, 1));
    }
}
