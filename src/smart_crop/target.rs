use std::fmt;
use std::str::FromStr;

use crate::error::{SmartCropError, SmartCropResult};

/// Requested output size; only its aspect ratio drives the crop search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetSize {
    width: u32,
    height: u32,
}

impl TargetSize {
    /// # Errors
    ///
    /// * `SmartCropError::InvalidTarget` - either dimension is zero
    pub fn new(width: u32, height: u32) -> SmartCropResult<Self> {
        if width == 0 || height == 0 {
            return Err(SmartCropError::InvalidTarget(format!(
                "{width}x{height}: both dimensions must be positive"
            )));
        }
        Ok(Self { width, height })
    }

    /// Accepts floating point input such as values read from a form field.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidTarget` - a value is non-finite, not positive,
    ///   fractional or does not fit in `u32`
    pub fn from_f64(width: f64, height: f64) -> SmartCropResult<Self> {
        Self::new(whole_pixels(width)?, whole_pixels(height)?)
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `width / height`
    #[must_use]
    pub fn ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

fn whole_pixels(value: f64) -> SmartCropResult<u32> {
    if !value.is_finite() || value <= 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(SmartCropError::InvalidTarget(format!(
            "{value} is not a positive whole number of pixels"
        )));
    }
    Ok(value as u32)
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for TargetSize {
    type Err = SmartCropError;

    /// Parses `WxH`; `X`, `*` and `:` are accepted as separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = s
            .split_once(['x', 'X', '*', ':'])
            .ok_or_else(|| SmartCropError::InvalidTarget(format!("{s:?}: expected WxH")))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| SmartCropError::InvalidTarget(format!("{s:?}: {e}")))
        };

        Self::new(parse(width)?, parse(height)?)
    }
}
