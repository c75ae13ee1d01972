use image::{ImageBuffer, Luma};

use crate::Image;

/// Element of the weight table for area interpolation.
#[derive(Debug, Clone, Copy)]
struct AreaWeight {
    /// Destination index
    destination_index: u32,
    /// Source index
    source_index: u32,
    /// Fraction of the destination footprint covered by the source cell
    weight: f64,
}

/// Compute resize area decimation table for one axis.
///
/// Destination cell `d` covers the source span `[d * s, (d + 1) * s)` with
/// `s = src_size / dst_size`. Each overlapping source cell contributes the
/// overlap length divided by the footprint length, so the weights of one
/// destination cell always sum to one.
fn compute_area_weights(src_size: u32, dst_size: u32) -> Vec<AreaWeight> {
    let scale = f64::from(src_size) / f64::from(dst_size);
    let mut tab = Vec::with_capacity(src_size as usize + dst_size as usize);

    for dx in 0..dst_size {
        let start = f64::from(dx) * scale;
        let end = (start + scale).min(f64::from(src_size));
        let footprint = end - start;

        let first = start.floor() as u32;
        let last = (end.ceil() as u32).min(src_size);

        for sx in first..last {
            let overlap = end.min(f64::from(sx + 1)) - start.max(f64::from(sx));
            // Skip slivers produced by floating point error at cell borders
            if overlap > 1e-9 {
                tab.push(AreaWeight {
                    destination_index: dx,
                    source_index: sx,
                    weight: overlap / footprint,
                });
            }
        }
    }

    tab
}

fn weight_totals(tab: &[AreaWeight], dst_size: u32) -> Vec<f64> {
    let mut totals = vec![0.0f64; dst_size as usize];
    for entry in tab {
        totals[entry.destination_index as usize] += entry.weight;
    }
    totals
}

/// Downsamples a single-channel float plane with INTER_AREA style averaging.
///
/// Both target dimensions must be non-zero and no larger than the source.
/// Equal sizes return a copy of the input.
pub(crate) fn resize_area_luma(
    src: &Image<Luma<f32>>,
    dst_width: u32,
    dst_height: u32,
) -> Image<Luma<f32>> {
    let (src_width, src_height) = src.dimensions();
    debug_assert!(dst_width >= 1 && dst_width <= src_width);
    debug_assert!(dst_height >= 1 && dst_height <= src_height);

    if (src_width, src_height) == (dst_width, dst_height) {
        return src.clone();
    }

    let x_weights = compute_area_weights(src_width, dst_width);
    let y_weights = compute_area_weights(src_height, dst_height);

    // Per-destination weight totals, used to renormalise so flat input stays flat
    let x_totals = weight_totals(&x_weights, dst_width);
    let y_totals = weight_totals(&y_weights, dst_height);

    // Horizontal pass: src_height rows of dst_width columns
    let mut horizontal = vec![0.0f64; dst_width as usize * src_height as usize];
    for (sy, row) in horizontal.chunks_exact_mut(dst_width as usize).enumerate() {
        for entry in &x_weights {
            let value = f64::from(src.get_pixel(entry.source_index, sy as u32)[0]);
            row[entry.destination_index as usize] += value * entry.weight;
        }
        for (value, &total) in row.iter_mut().zip(&x_totals) {
            *value /= total;
        }
    }

    // Vertical pass
    let mut accumulated = vec![0.0f64; dst_width as usize * dst_height as usize];
    for entry in &y_weights {
        let src_row = entry.source_index as usize * dst_width as usize;
        let dst_row = entry.destination_index as usize * dst_width as usize;
        for dx in 0..dst_width as usize {
            accumulated[dst_row + dx] += horizontal[src_row + dx] * entry.weight;
        }
    }

    let output: Vec<f32> = accumulated
        .chunks_exact(dst_width as usize)
        .zip(&y_totals)
        .flat_map(|(row, &total)| row.iter().map(move |&value| (value / total) as f32))
        .collect();

    ImageBuffer::from_raw(dst_width, dst_height, output)
        .unwrap_or_else(|| ImageBuffer::new(dst_width, dst_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_weights_sum_to_one_per_destination() {
        for (src, dst) in [(4, 2), (7, 3), (200, 67), (5, 5)] {
            let tab = compute_area_weights(src, dst);
            for sum in weight_totals(&tab, dst) {
                assert!((sum - 1.0).abs() < 1e-9, "{src}->{dst}: {sum}");
            }
        }
    }

    #[test]
    fn integer_factor_averages_blocks() {
        let src: Image<Luma<f32>> =
            ImageBuffer::from_fn(4, 2, |x, y| Luma([(x + 4 * y) as f32]));
        let result = resize_area_luma(&src, 2, 1);

        assert_eq!(result.dimensions(), (2, 1));
        // (0 + 1 + 4 + 5) / 4 and (2 + 3 + 6 + 7) / 4
        assert!((result.get_pixel(0, 0)[0] - 2.5).abs() < 1e-5);
        assert!((result.get_pixel(1, 0)[0] - 4.5).abs() < 1e-5);
    }

    #[test]
    fn fractional_factor_preserves_flat_planes() {
        for (value, (w, h), (dw, dh)) in [
            (42.0f32, (9, 7), (4, 3)),
            (118.4071, (700, 300), (200, 86)),
            (0.1, (333, 250), (200, 150)),
        ] {
            let src: Image<Luma<f32>> = ImageBuffer::from_pixel(w, h, Luma([value]));
            let result = resize_area_luma(&src, dw, dh);

            assert_eq!(result.dimensions(), (dw, dh));
            assert!(result.pixels().all(|pixel| pixel[0] == value), "{w}x{h} -> {dw}x{dh}");
        }
    }

    #[test]
    fn same_size_is_identity() {
        let src: Image<Luma<f32>> = ImageBuffer::from_fn(3, 3, |x, y| Luma([(x * y) as f32]));
        assert_eq!(resize_area_luma(&src, 3, 3), src);
    }
}
