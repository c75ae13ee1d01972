use image::{GenericImageView, ImageBuffer, Luma, Pixel, Primitive};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::{SmartCropError, SmartCropResult};
use crate::smart_crop::area_resize::resize_area_luma;
use crate::smart_crop::coordinates::{round_to_u32, Scale};
use crate::utils::validate_image_dimensions;
use crate::Image;

/// Default cap on the longer side of the saliency grid
pub const DEFAULT_MAX_SIZE: u32 = 200;

/// ITU-R BT.709 luma coefficients
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Per-pixel visual importance over a downsampled copy of an image
///
/// Scores are non-negative central-difference gradient magnitudes of the
/// luminance plane. The outermost rows and columns are always zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SaliencyGrid {
    data: Vec<f32>,
    width: u32,
    height: u32,
    scale: Scale,
}

impl SaliencyGrid {
    /// Builds a grid from scores computed elsewhere.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidImage` - a dimension is zero
    /// * `SmartCropError::DimensionMismatch` - `data.len() != width * height`
    /// * `SmartCropError::InvalidParameter` - bad scale or a negative / non-finite score
    pub fn from_raw(width: u32, height: u32, scale: f64, data: Vec<f32>) -> SmartCropResult<Self> {
        validate_image_dimensions(width, height)?;

        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(SmartCropError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }

        let scale = Scale::new(scale).filter(|s| s.factor() <= 1.0).ok_or_else(|| {
            SmartCropError::InvalidParameter(format!("scale must be in (0, 1], got {scale}"))
        })?;

        if let Some(bad) = data.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(SmartCropError::InvalidParameter(format!(
                "saliency scores must be finite and non-negative, got {bad}"
            )));
        }

        Ok(Self {
            data,
            width,
            height,
            scale,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Factor mapping source coordinates into this grid
    #[must_use]
    pub const fn scale(&self) -> Scale {
        self.scale
    }

    /// Score at `(x, y)`; panics when out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside grid");
        self.data[(y * self.width + x) as usize]
    }

    /// Row-major scores
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Provides saliency estimation for images
pub trait EstimateSaliency {
    /// Downsamples the image so its longer side is at most `max_size`
    /// and scores every grid pixel by its luminance gradient magnitude.
    ///
    /// The image is never upsampled.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidImage` - the image has a zero dimension
    /// * `SmartCropError::InvalidParameter` - `max_size` is zero
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use imageops_smartcrop::{EstimateSaliency, Image};
    /// use image::Rgb;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgb<u8>> = Image::new(800, 600);
    /// let grid = image.estimate_saliency(200)?;
    /// assert_eq!((grid.width(), grid.height()), (200, 150));
    /// # Ok(())
    /// # }
    /// ```
    fn estimate_saliency(&self, max_size: u32) -> SmartCropResult<SaliencyGrid>;
}

impl<I, P> EstimateSaliency for I
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    fn estimate_saliency(&self, max_size: u32) -> SmartCropResult<SaliencyGrid> {
        estimate_saliency(self, max_size)
    }
}

/// Free-function form of [`EstimateSaliency::estimate_saliency`].
///
/// # Errors
///
/// See [`EstimateSaliency::estimate_saliency`].
pub fn estimate_saliency<I, P>(image: &I, max_size: u32) -> SmartCropResult<SaliencyGrid>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    let (width, height) = image.dimensions();
    validate_image_dimensions(width, height)?;
    if max_size == 0 {
        return Err(SmartCropError::InvalidParameter(
            "max_size must be at least 1".to_string(),
        ));
    }

    let factor = (f64::from(max_size) / f64::from(width))
        .min(f64::from(max_size) / f64::from(height))
        .min(1.0);
    let grid_width = round_to_u32(f64::from(width) * factor).clamp(1, width);
    let grid_height = round_to_u32(f64::from(height) * factor).clamp(1, height);
    let scale = Scale::new(factor).unwrap_or_default();

    let luminance = luminance_plane(image);
    let luminance = resize_area_luma(&luminance, grid_width, grid_height);
    let data = gradient_magnitude(luminance.as_raw(), grid_width, grid_height);

    log::debug!(
        "saliency grid {grid_width}x{grid_height} for {width}x{height} image (scale {factor:.4})"
    );

    Ok(SaliencyGrid {
        data,
        width: grid_width,
        height: grid_height,
        scale,
    })
}

fn luminance_plane<I, P>(image: &I) -> Image<Luma<f32>>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    // Normalise every subpixel type onto the 8-bit range
    let max_value: f32 = P::Subpixel::DEFAULT_MAX_VALUE.into();
    let to_8bit = 255.0 / max_value;
    let (width, height) = image.dimensions();

    ImageBuffer::from_fn(width, height, |x, y| {
        let [r, g, b] = image.get_pixel(x, y).to_rgb().0;
        let (r, g, b): (f32, f32, f32) = (r.into(), g.into(), b.into());
        let luma = LUMA_R * r + LUMA_G * g + LUMA_B * b;
        Luma([luma * to_8bit])
    })
}

fn gradient_magnitude(luminance: &[f32], width: u32, height: u32) -> Vec<f32> {
    let mut saliency = vec![0.0f32; width as usize * height as usize];

    #[cfg(feature = "rayon")]
    saliency
        .par_chunks_exact_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| fill_gradient_row(luminance, width, height, y, row));

    #[cfg(not(feature = "rayon"))]
    saliency
        .chunks_exact_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| fill_gradient_row(luminance, width, height, y, row));

    saliency
}

/// Fills one output row; border rows and columns stay zero.
fn fill_gradient_row(luminance: &[f32], width: u32, height: u32, y: usize, row: &mut [f32]) {
    let (width, height) = (width as usize, height as usize);
    if y == 0 || y + 1 >= height || width < 3 {
        return;
    }

    let above = &luminance[(y - 1) * width..y * width];
    let current = &luminance[y * width..(y + 1) * width];
    let below = &luminance[(y + 1) * width..(y + 2) * width];

    for x in 1..width - 1 {
        let gx = current[x + 1] - current[x - 1];
        let gy = below[x] - above[x];
        row[x] = gx.hypot(gy);
    }
}
