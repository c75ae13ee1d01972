mod error;
mod smart_crop;
#[cfg(test)]
mod test_utils;
mod utils;

use image::{ImageBuffer, Pixel};

pub use error::{SmartCropError, SmartCropResult};
pub use smart_crop::coordinates::{
    to_grid_space, to_source_space, GridSpace, Point, Rect, Scale, SourceSpace,
};
pub use smart_crop::options::{CoveragePolicy, CropOptions};
pub use smart_crop::region::aggregate_required_regions;
pub use smart_crop::saliency::{estimate_saliency, EstimateSaliency, SaliencyGrid, DEFAULT_MAX_SIZE};
pub use smart_crop::search::{
    find_best_crop, find_best_crop_with_options, CropAnalysis, CropRegion, Placement, SearchPlan,
    SmartCrop,
};
pub use smart_crop::summed_area_table::{build_integral, CreateSummedAreaTable, SummedAreaTable};
pub use smart_crop::target::TargetSize;

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
