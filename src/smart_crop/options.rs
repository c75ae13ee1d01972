use crate::error::{SmartCropError, SmartCropResult};
use crate::smart_crop::saliency::DEFAULT_MAX_SIZE;

/// What to give up when a mandatory box cannot be framed at the target ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoveragePolicy {
    /// Keep the requested aspect ratio; the window is shrunk back to the
    /// largest target-ratio window the image allows, and placement falls
    /// back to the clamped box origin if the box no longer fits.
    ///
    /// The base window is already the largest target-ratio window in the
    /// image, so a grown window fits only through one pixel of rounding.
    /// In practice the crop never grows under this policy and an oversized
    /// box is only partly covered. Use [`CoveragePolicy::CoverRequired`] when
    /// the crop must expand to the whole box.
    #[default]
    StrictRatio,
    /// Keep the mandatory box inside the crop; each axis is clamped to the
    /// image on its own, so the ratio can break in the clamped axis.
    CoverRequired,
}

/// Tuning knobs for the crop search
///
/// This struct encapsulates the parameters that trade search precision
/// against speed, plus the policy for oversized mandatory regions.
#[derive(Clone, Debug, PartialEq)]
pub struct CropOptions {
    /// Longer side of the saliency grid in pixels
    ///
    /// Larger values place the crop more precisely but cost quadratically
    /// more time to score.
    pub max_size: u32,

    /// Stride between candidate origins as a fraction of the window size
    ///
    /// `0.06` moves the window by 6% of its width or height per step.
    /// Must be in `(0, 1]`.
    pub step_fraction: f64,

    /// Behaviour when the mandatory box is larger than the target-ratio window
    pub coverage: CoveragePolicy,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            step_fraction: 0.06,
            coverage: CoveragePolicy::default(),
        }
    }
}

impl CropOptions {
    // Create a new instance
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Set saliency grid cap
    #[must_use]
    pub fn set_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    // Set search stride fraction
    #[must_use]
    pub fn set_step_fraction(mut self, fraction: f64) -> Self {
        self.step_fraction = fraction;
        self
    }

    // Set coverage policy
    #[must_use]
    pub fn set_coverage(mut self, coverage: CoveragePolicy) -> Self {
        self.coverage = coverage;
        self
    }

    /// Checks that every field is usable.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidParameter` - `max_size` is zero or
    ///   `step_fraction` is outside `(0, 1]`
    pub fn validate(&self) -> SmartCropResult<()> {
        if self.max_size == 0 {
            return Err(SmartCropError::InvalidParameter(
                "max_size must be at least 1".to_string(),
            ));
        }
        if !(self.step_fraction.is_finite()
            && self.step_fraction > 0.0
            && self.step_fraction <= 1.0)
        {
            return Err(SmartCropError::InvalidParameter(format!(
                "step_fraction must be in (0, 1], got {}",
                self.step_fraction
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_search() {
        let options = CropOptions::new();
        assert_eq!(options.max_size, 200);
        assert_eq!(options.step_fraction, 0.06);
        assert_eq!(options.coverage, CoveragePolicy::StrictRatio);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn setters_chain() {
        let options = CropOptions::new()
            .set_max_size(64)
            .set_step_fraction(0.25)
            .set_coverage(CoveragePolicy::CoverRequired);
        assert_eq!(options.max_size, 64);
        assert_eq!(options.step_fraction, 0.25);
        assert_eq!(options.coverage, CoveragePolicy::CoverRequired);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for options in [
            CropOptions::new().set_max_size(0),
            CropOptions::new().set_step_fraction(0.0),
            CropOptions::new().set_step_fraction(-0.1),
            CropOptions::new().set_step_fraction(1.5),
            CropOptions::new().set_step_fraction(f64::NAN),
        ] {
            assert!(matches!(
                options.validate(),
                Err(SmartCropError::InvalidParameter(_))
            ));
        }
    }
}
