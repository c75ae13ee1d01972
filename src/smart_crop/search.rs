use image::{GenericImageView, Pixel};
use itertools::iproduct;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::error::{SmartCropError, SmartCropResult};
use crate::smart_crop::coordinates::{round_to_u32, to_source_space, GridSpace, Rect, SourceSpace};
use crate::smart_crop::options::{CoveragePolicy, CropOptions};
use crate::smart_crop::region::aggregate_required_regions;
use crate::smart_crop::saliency::{estimate_saliency, SaliencyGrid};
use crate::smart_crop::summed_area_table::{CreateSummedAreaTable, SummedAreaTable};
use crate::smart_crop::target::TargetSize;
use crate::utils::validate_image_dimensions;

/// Final crop rectangle in source-image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Exclusive right edge
    #[must_use]
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    #[must_use]
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Returns `true` when `region` lies entirely inside the crop.
    #[must_use]
    pub fn contains(&self, region: &Rect<SourceSpace>) -> bool {
        self.to_rect().contains(region)
    }

    #[must_use]
    pub fn to_rect(&self) -> Rect<SourceSpace> {
        // Crop origins are bounded by the image size.
        Rect::new(self.x as i32, self.y as i32, self.width, self.height)
    }
}

impl From<CropRegion> for imageproc::rect::Rect {
    fn from(crop: CropRegion) -> Self {
        Self::at(crop.x as i32, crop.y as i32).of_size(crop.width, crop.height)
    }
}

/// Outcome of the stride-grid search, in grid space
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Highest-scoring admissible window
    Found { window: Rect<GridSpace>, score: f64 },
    /// No stride position contained the mandatory box; the box origin was
    /// clamped into the valid origin range without scoring
    FallbackClamped { window: Rect<GridSpace> },
}

impl Placement {
    #[must_use]
    pub const fn window(&self) -> Rect<GridSpace> {
        match self {
            Self::Found { window, .. } | Self::FallbackClamped { window } => *window,
        }
    }

    #[must_use]
    pub const fn score(&self) -> Option<f64> {
        match self {
            Self::Found { score, .. } => Some(*score),
            Self::FallbackClamped { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::FallbackClamped { .. })
    }
}

/// Everything derived from a request before any window is scored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchPlan {
    pub target: TargetSize,
    /// Crop size in source pixels
    pub crop_width: u32,
    pub crop_height: u32,
    /// Crop size in grid cells
    pub window_width: u32,
    pub window_height: u32,
    pub step_x: u32,
    pub step_y: u32,
    /// Aggregated mandatory box, clipped to the image
    pub required: Option<Rect<SourceSpace>>,
    /// `required` in grid space, clipped to the grid
    pub required_grid: Option<Rect<GridSpace>>,
}

impl SearchPlan {
    /// Candidate origins in row-major order: every `y` row, then every `x`.
    pub fn candidates(
        &self,
        grid_width: u32,
        grid_height: u32,
    ) -> impl Iterator<Item = (u32, u32)> {
        let max_x = grid_width.saturating_sub(self.window_width);
        let max_y = grid_height.saturating_sub(self.window_height);
        iproduct!(
            (0..=max_y).step_by(self.step_y as usize),
            (0..=max_x).step_by(self.step_x as usize)
        )
        .map(|(y, x)| (x, y))
    }

    /// Whether the window at `(x, y)` contains the grid-space mandatory box.
    #[must_use]
    pub fn admits(&self, x: u32, y: u32) -> bool {
        self.required_grid.is_none_or(|required| {
            let window = Rect::<GridSpace>::new(
                x as i32,
                y as i32,
                self.window_width,
                self.window_height,
            );
            window.contains(&required)
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: u32,
    y: u32,
    score: f64,
}

/// Ties keep the earlier candidate.
fn keep_first_max(best: Option<Candidate>, candidate: Candidate) -> Option<Candidate> {
    match best {
        Some(best) if candidate.score <= best.score => Some(best),
        _ => Some(candidate),
    }
}

/// Saliency grid and summed-area table of one image, reusable across requests
///
/// Building the analysis is the expensive part; [`CropAnalysis::find_crop`]
/// only scores windows and can be called for any number of targets.
#[derive(Debug, Clone)]
pub struct CropAnalysis {
    image_width: u32,
    image_height: u32,
    grid: SaliencyGrid,
    table: SummedAreaTable,
    options: CropOptions,
}

impl CropAnalysis {
    /// Analyses `image` with the given options.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidImage` - the image has a zero dimension
    /// * `SmartCropError::InvalidParameter` - `options` fail validation
    pub fn new<I, P>(image: &I, options: &CropOptions) -> SmartCropResult<Self>
    where
        I: GenericImageView<Pixel = P>,
        P: Pixel,
        P::Subpixel: Into<f32>,
    {
        options.validate()?;
        let (image_width, image_height) = image.dimensions();
        let grid = estimate_saliency(image, options.max_size)?;
        Self::from_saliency(image_width, image_height, grid, options)
    }

    /// Wraps a saliency grid computed elsewhere for an image of the given size.
    ///
    /// `options.max_size` is ignored; the grid's own scale is used.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::InvalidImage` - an image dimension is zero
    /// * `SmartCropError::InvalidParameter` - the grid is larger than the image
    ///   or `options` fail validation
    pub fn from_saliency(
        image_width: u32,
        image_height: u32,
        grid: SaliencyGrid,
        options: &CropOptions,
    ) -> SmartCropResult<Self> {
        validate_image_dimensions(image_width, image_height)?;
        options.validate()?;
        if grid.width() > image_width || grid.height() > image_height {
            return Err(SmartCropError::InvalidParameter(format!(
                "saliency grid {}x{} is larger than the {image_width}x{image_height} image",
                grid.width(),
                grid.height()
            )));
        }

        let table = grid.create_summed_area_table();
        Ok(Self {
            image_width,
            image_height,
            grid,
            table,
            options: options.clone(),
        })
    }

    #[must_use]
    pub const fn grid(&self) -> &SaliencyGrid {
        &self.grid
    }

    #[must_use]
    pub const fn table(&self) -> &SummedAreaTable {
        &self.table
    }

    #[must_use]
    pub const fn options(&self) -> &CropOptions {
        &self.options
    }

    #[must_use]
    pub const fn image_dimensions(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// Derives crop size, grid window, strides and the mandatory box.
    #[must_use]
    pub fn plan(&self, target: TargetSize, regions: &[Rect<SourceSpace>]) -> SearchPlan {
        let required = aggregate_required_regions(regions)
            .map(|boxed| boxed.clip_to(self.image_width, self.image_height));
        let (crop_width, crop_height) = self.crop_size(target, required.as_ref());

        let scale = self.grid.scale();
        let window_width = scale.to_grid_length(crop_width).min(self.grid.width());
        let window_height = scale.to_grid_length(crop_height).min(self.grid.height());
        let step = |length: u32| {
            round_to_u32(f64::from(length) * self.options.step_fraction).max(1)
        };

        let required_grid = required.map(|boxed| {
            boxed
                .to_grid_space(scale)
                .clip_to(self.grid.width(), self.grid.height())
        });

        let plan = SearchPlan {
            target,
            crop_width,
            crop_height,
            window_width,
            window_height,
            step_x: step(window_width),
            step_y: step(window_height),
            required,
            required_grid,
        };
        log::debug!("crop plan for {target}: {plan:?}");
        plan
    }

    /// Target-ratio crop size, grown to the mandatory box per the coverage policy.
    fn crop_size(&self, target: TargetSize, required: Option<&Rect<SourceSpace>>) -> (u32, u32) {
        let (width, height) = (self.image_width, self.image_height);
        let ratio = target.ratio();
        let image_ratio = f64::from(width) / f64::from(height);

        let base = if image_ratio > ratio {
            (round_to_u32(f64::from(height) * ratio).clamp(1, width), height)
        } else {
            (width, round_to_u32(f64::from(width) / ratio).clamp(1, height))
        };

        let Some(required) = required else {
            return base;
        };
        if required.width <= base.0 && required.height <= base.1 {
            return base;
        }

        let mut grown_width = base.0.max(required.width);
        let mut grown_height = base.1.max(required.height);
        if f64::from(grown_width) / f64::from(grown_height) > ratio {
            grown_height = round_to_u32(f64::from(grown_width) / ratio).max(1);
        } else {
            grown_width = round_to_u32(f64::from(grown_height) * ratio).max(1);
        }

        match self.options.coverage {
            CoveragePolicy::StrictRatio if grown_width <= width && grown_height <= height => {
                (grown_width, grown_height)
            }
            CoveragePolicy::StrictRatio => {
                log::trace!(
                    "mandatory box {}x{} cannot be framed at ratio {ratio:.4}; keeping {}x{}",
                    required.width,
                    required.height,
                    base.0,
                    base.1
                );
                base
            }
            CoveragePolicy::CoverRequired => (grown_width.min(width), grown_height.min(height)),
        }
    }

    /// Scores every stride-grid window and picks the best admissible one.
    #[must_use]
    pub fn search(&self, plan: &SearchPlan) -> Placement {
        let (grid_width, grid_height) = (self.grid.width(), self.grid.height());

        if let Some(best) = self.scan(plan) {
            return Placement::Found {
                window: Rect::new(
                    best.x as i32,
                    best.y as i32,
                    plan.window_width,
                    plan.window_height,
                ),
                score: best.score,
            };
        }

        let max_x = i64::from(grid_width.saturating_sub(plan.window_width));
        let max_y = i64::from(grid_height.saturating_sub(plan.window_height));
        let (x, y) = plan.required_grid.map_or((0, 0), |required| {
            (
                i64::from(required.x).clamp(0, max_x),
                i64::from(required.y).clamp(0, max_y),
            )
        });
        log::trace!("no stride position contains the mandatory box; clamped to ({x}, {y})");

        Placement::FallbackClamped {
            // Both values lie in [0, grid size].
            window: Rect::new(x as i32, y as i32, plan.window_width, plan.window_height),
        }
    }

    fn score(&self, plan: &SearchPlan, x: u32, y: u32) -> Candidate {
        Candidate {
            x,
            y,
            score: self
                .table
                .sum_region(x, y, plan.window_width, plan.window_height),
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn scan(&self, plan: &SearchPlan) -> Option<Candidate> {
        plan.candidates(self.grid.width(), self.grid.height())
            .filter(|&(x, y)| plan.admits(x, y))
            .map(|(x, y)| self.score(plan, x, y))
            .fold(None, keep_first_max)
    }

    /// Rows are scored in parallel and reduced in row order, so the result
    /// is identical to the sequential scan.
    #[cfg(feature = "rayon")]
    fn scan(&self, plan: &SearchPlan) -> Option<Candidate> {
        let max_x = self.grid.width().saturating_sub(plan.window_width);
        let max_y = self.grid.height().saturating_sub(plan.window_height);
        let rows: Vec<u32> = (0..=max_y).step_by(plan.step_y as usize).collect();

        let row_winners: Vec<Option<Candidate>> = rows
            .par_iter()
            .map(|&y| {
                (0..=max_x)
                    .step_by(plan.step_x as usize)
                    .filter(|&x| plan.admits(x, y))
                    .map(|x| self.score(plan, x, y))
                    .fold(None, keep_first_max)
            })
            .collect();

        row_winners.into_iter().flatten().fold(None, keep_first_max)
    }

    /// Maps a placement back to source pixels.
    ///
    /// The origin is clamped so the crop stays inside the image, and on every
    /// axis where the mandatory box fits it is snapped so the box stays
    /// inside the crop despite grid rounding.
    #[must_use]
    pub fn to_crop_region(&self, plan: &SearchPlan, placement: &Placement) -> CropRegion {
        let origin = to_source_space(placement.window().origin(), self.grid.scale());
        let max_x = self.image_width - plan.crop_width;
        let max_y = self.image_height - plan.crop_height;

        let mut x = (origin.x.max(0) as u32).min(max_x);
        let mut y = (origin.y.max(0) as u32).min(max_y);
        if let Some(required) = plan.required {
            x = snap_to_cover(x, required.x as u32, required.width, plan.crop_width, max_x);
            y = snap_to_cover(y, required.y as u32, required.height, plan.crop_height, max_y);
        }

        CropRegion {
            x,
            y,
            width: plan.crop_width,
            height: plan.crop_height,
        }
    }

    /// Plans, searches and maps back in one call.
    #[must_use]
    pub fn find_crop(&self, target: TargetSize, regions: &[Rect<SourceSpace>]) -> CropRegion {
        let plan = self.plan(target, regions);
        let placement = self.search(&plan);
        let crop = self.to_crop_region(&plan, &placement);
        log::debug!(
            "crop for {target}: {crop:?} ({})",
            if placement.is_fallback() { "fallback" } else { "found" }
        );
        crop
    }
}

/// Moves `position` into `[start + length - window, start]` when the span fits.
fn snap_to_cover(position: u32, start: u32, length: u32, window: u32, max: u32) -> u32 {
    if length > window {
        return position;
    }
    let low = (start + length).saturating_sub(window);
    let high = start.min(max);
    position.min(high).max(low)
}

/// Selects the crop of `image` with the given aspect ratio that keeps the most
/// salient content, containing `required_regions` whenever possible.
///
/// # Errors
///
/// * `SmartCropError::InvalidTarget` - a target dimension is zero
/// * `SmartCropError::InvalidImage` - the image has a zero dimension
///
/// # Examples
///
/// ```no_run
/// use imageops_smartcrop::{find_best_crop, Image, Rect};
/// use image::Rgb;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let image: Image<Rgb<u8>> = Image::new(400, 300);
/// let face = Rect::new(250, 40, 60, 60);
/// let crop = find_best_crop(&image, 100, 100, &[face])?;
/// assert!(crop.contains(&face));
/// # Ok(())
/// # }
/// ```
pub fn find_best_crop<I, P>(
    image: &I,
    target_width: u32,
    target_height: u32,
    required_regions: &[Rect<SourceSpace>],
) -> SmartCropResult<CropRegion>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    find_best_crop_with_options(
        image,
        target_width,
        target_height,
        required_regions,
        &CropOptions::default(),
    )
}

/// [`find_best_crop`] with explicit options.
///
/// # Errors
///
/// As [`find_best_crop`], plus `SmartCropError::InvalidParameter` for invalid options.
pub fn find_best_crop_with_options<I, P>(
    image: &I,
    target_width: u32,
    target_height: u32,
    required_regions: &[Rect<SourceSpace>],
    options: &CropOptions,
) -> SmartCropResult<CropRegion>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    let target = TargetSize::new(target_width, target_height)?;
    let analysis = CropAnalysis::new(image, options)?;
    Ok(analysis.find_crop(target, required_regions))
}

/// Content-aware cropping for images
pub trait SmartCrop {
    /// See [`find_best_crop`].
    ///
    /// # Errors
    ///
    /// As [`find_best_crop`].
    fn smart_crop(
        &self,
        target_width: u32,
        target_height: u32,
        required_regions: &[Rect<SourceSpace>],
    ) -> SmartCropResult<CropRegion>;

    /// See [`find_best_crop_with_options`].
    ///
    /// # Errors
    ///
    /// As [`find_best_crop_with_options`].
    fn smart_crop_with_options(
        &self,
        target_width: u32,
        target_height: u32,
        required_regions: &[Rect<SourceSpace>],
        options: &CropOptions,
    ) -> SmartCropResult<CropRegion>;
}

impl<I, P> SmartCrop for I
where
    I: GenericImageView<Pixel = P>,
    P: Pixel,
    P::Subpixel: Into<f32>,
{
    fn smart_crop(
        &self,
        target_width: u32,
        target_height: u32,
        required_regions: &[Rect<SourceSpace>],
    ) -> SmartCropResult<CropRegion> {
        find_best_crop(self, target_width, target_height, required_regions)
    }

    fn smart_crop_with_options(
        &self,
        target_width: u32,
        target_height: u32,
        required_regions: &[Rect<SourceSpace>],
        options: &CropOptions,
    ) -> SmartCropResult<CropRegion> {
        find_best_crop_with_options(self, target_width, target_height, required_regions, options)
    }
}
