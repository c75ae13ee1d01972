use crate::smart_crop::coordinates::{Rect, SourceSpace};

/// Merges mandatory regions into the single box the crop has to contain.
///
/// Returns `None` when there are no regions. Otherwise the result is the
/// smallest axis-aligned rectangle covering every input, with its origin
/// clamped to be non-negative and each side at least one pixel long.
#[must_use]
pub fn aggregate_required_regions(regions: &[Rect<SourceSpace>]) -> Option<Rect<SourceSpace>> {
    let (first, rest) = regions.split_first()?;

    let mut bounds = [
        i64::from(first.x),
        i64::from(first.y),
        first.right(),
        first.bottom(),
    ];
    for region in rest {
        update_bounds(&mut bounds, region);
    }

    let [x1, y1, x2, y2] = bounds;
    let x = x1.max(0);
    let y = y1.max(0);
    let width = (x2 - x).clamp(1, i64::from(u32::MAX));
    let height = (y2 - y).clamp(1, i64::from(u32::MAX));

    // x1/y1 come from i32 origins and were clamped up to zero.
    Some(Rect::new(x as i32, y as i32, width as u32, height as u32))
}

fn update_bounds(bounds: &mut [i64; 4], region: &Rect<SourceSpace>) {
    bounds[0] = bounds[0].min(i64::from(region.x));
    bounds[1] = bounds[1].min(i64::from(region.y));
    bounds[2] = bounds[2].max(region.right());
    bounds[3] = bounds[3].max(region.bottom());
}
