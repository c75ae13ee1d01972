use thiserror::Error;

/// Result type used by every fallible smart-crop operation
pub type SmartCropResult<T> = Result<T, SmartCropError>;

/// Error type for crop selection
///
/// This error type represents the input validation failures that can occur
/// before the crop search runs, plus the checked variant of out-of-range
/// summed-area queries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SmartCropError {
    /// The requested output size cannot describe an aspect ratio
    ///
    /// This error is returned when a target width or height is zero,
    /// negative, non-finite, fractional or not a number at all.
    #[error("Invalid target dimensions: {0}")]
    InvalidTarget(String),

    /// The source image has no pixels
    ///
    /// This error occurs when either dimension of the image is zero.
    #[error("Invalid image dimensions {width}x{height}: both must be at least 1")]
    InvalidImage { width: u32, height: u32 },

    /// Invalid parameter provided to the operation
    ///
    /// This error is returned when a configuration value is invalid
    /// or outside the acceptable range for the operation.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Saliency data does not match the declared grid dimensions
    ///
    /// This error is returned when building a grid from raw scores whose
    /// length is not `width * height`.
    #[error("Saliency data length mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected number of cells
        expected: usize,
        /// Actual number of cells
        actual: usize,
    },

    /// A rectangle query reaches outside the summed-area table
    #[error(
        "Region {width}x{height} at ({x}, {y}) exceeds table bounds {table_width}x{table_height}"
    )]
    IndexOutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        table_width: u32,
        table_height: u32,
    },
}
