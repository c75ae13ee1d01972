//! Internal utility functions for imageops-smartcrop.
//!
//! This module contains validation shared by the saliency estimator and the crop search.

use crate::error::{SmartCropError, SmartCropResult};

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise `SmartCropError::InvalidImage`
pub fn validate_image_dimensions(width: u32, height: u32) -> SmartCropResult<()> {
    if width == 0 || height == 0 {
        Err(SmartCropError::InvalidImage { width, height })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_image_dimensions() {
        assert!(validate_image_dimensions(100, 100).is_ok());
        assert!(validate_image_dimensions(1, 1).is_ok());
        assert_eq!(
            validate_image_dimensions(0, 100),
            Err(SmartCropError::InvalidImage {
                width: 0,
                height: 100
            })
        );
        assert!(validate_image_dimensions(100, 0).is_err());
        assert!(validate_image_dimensions(0, 0).is_err());
    }
}
