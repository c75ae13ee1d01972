use image::Luma;

use crate::error::{SmartCropError, SmartCropResult};
use crate::smart_crop::saliency::SaliencyGrid;
use crate::Image;

/// Summed-area table over a single-channel float grid
///
/// The table is `(width + 1) x (height + 1)` with a zero first row and
/// column: `table[y][x]` is the sum of every source value in `[0, x) x [0, y)`.
/// Accumulation is done in `f64` so long rows of `f32` scores do not drift.
#[derive(Debug, Clone, PartialEq)]
pub struct SummedAreaTable {
    data: Vec<f64>,
    /// Width of the summed grid (the table is one wider)
    width: u32,
    /// Height of the summed grid (the table is one taller)
    height: u32,
}

/// Provides summed-area table construction
pub trait CreateSummedAreaTable {
    /// Builds the summed-area table of `self`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use imageops_smartcrop::{CreateSummedAreaTable, SaliencyGrid};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let grid = SaliencyGrid::from_raw(3, 3, 1.0, vec![1.0; 9])?;
    /// let table = grid.create_summed_area_table();
    /// assert_eq!(table.sum_region(0, 0, 3, 3), 9.0);
    /// # Ok(())
    /// # }
    /// ```
    fn create_summed_area_table(&self) -> SummedAreaTable;
}

impl CreateSummedAreaTable for SaliencyGrid {
    fn create_summed_area_table(&self) -> SummedAreaTable {
        SummedAreaTable::from_data(self.data(), self.width(), self.height())
    }
}

impl CreateSummedAreaTable for Image<Luma<f32>> {
    fn create_summed_area_table(&self) -> SummedAreaTable {
        let (width, height) = self.dimensions();
        SummedAreaTable::from_data(self.as_raw(), width, height)
    }
}

/// Builds the summed-area table of a saliency grid.
#[must_use]
pub fn build_integral(grid: &SaliencyGrid) -> SummedAreaTable {
    grid.create_summed_area_table()
}

impl SummedAreaTable {
    /// 単一チャンネルのデータから積分画像を作成します
    ///
    /// # 引数
    /// * `data` - 元となるデータ（行優先順序）
    /// * `width` - 幅
    /// * `height` - 高さ
    ///
    /// # Panics
    ///
    /// `data.len() != width * height` の場合
    #[must_use]
    pub fn from_data(data: &[f32], width: u32, height: u32) -> Self {
        assert_eq!(data.len(), width as usize * height as usize);

        let stride = width as usize + 1;
        let mut table = vec![0.0f64; stride * (height as usize + 1)];

        for y in 1..=height as usize {
            // sat(x, y) = sat(x, y-1) + src(0..x, y-1)
            let mut row_sum = 0.0f64;
            for x in 1..=width as usize {
                row_sum += f64::from(data[(y - 1) * width as usize + (x - 1)]);
                let index = y * stride + x;
                table[index] = table[index - stride] + row_sum;
            }
        }

        Self {
            data: table,
            width,
            height,
        }
    }

    /// Sum of the half-open rectangle `[x, x + w) x [y, y + h)`
    ///
    /// Callers must keep the rectangle inside the grid; this is only
    /// checked in debug builds. Use [`Self::checked_sum_region`] when the
    /// rectangle comes from outside the crate.
    ///
    /// # 計算式
    /// Sum = sat(x+w, y+h) - sat(x+w, y) - sat(x, y+h) + sat(x, y)
    #[must_use]
    #[inline]
    pub fn sum_region(&self, x: u32, y: u32, w: u32, h: u32) -> f64 {
        debug_assert!(
            self.in_bounds(x, y, w, h),
            "region {w}x{h} at ({x}, {y}) outside {}x{} table",
            self.width,
            self.height
        );

        let stride = self.width as usize + 1;
        let (x1, y1) = (x as usize, y as usize);
        let (x2, y2) = (x1 + w as usize, y1 + h as usize);

        self.data[y2 * stride + x2] - self.data[y1 * stride + x2] - self.data[y2 * stride + x1]
            + self.data[y1 * stride + x1]
    }

    /// Like [`Self::sum_region`] but reports out-of-range queries.
    ///
    /// # Errors
    ///
    /// * `SmartCropError::IndexOutOfRange` - the rectangle leaves the grid
    pub fn checked_sum_region(&self, x: u32, y: u32, w: u32, h: u32) -> SmartCropResult<f64> {
        if self.in_bounds(x, y, w, h) {
            Ok(self.sum_region(x, y, w, h))
        } else {
            Err(SmartCropError::IndexOutOfRange {
                x,
                y,
                width: w,
                height: h,
                table_width: self.width,
                table_height: self.height,
            })
        }
    }

    /// Raw prefix sum `table[y][x]`, `0 <= x <= width`, `0 <= y <= height`
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        assert!(x <= self.width && y <= self.height);
        self.data[y as usize * (self.width as usize + 1) + x as usize]
    }

    /// Sum over the whole grid
    #[must_use]
    pub fn total(&self) -> f64 {
        self.get(self.width, self.height)
    }

    /// グリッドの幅を取得します
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// グリッドの高さを取得します
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// 積分画像の生データへの参照を取得します
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    fn in_bounds(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        x.checked_add(w).is_some_and(|right| right <= self.width)
            && y.checked_add(h).is_some_and(|bottom| bottom <= self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    fn three_by_three() -> SummedAreaTable {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        SummedAreaTable::from_data(&data, 3, 3)
    }

    #[test]
    fn test_padded_prefix_sums() {
        let sat = three_by_three();

        // 0  0  0  0
        // 0  1  3  6
        // 0  5 12 21
        // 0 12 27 45
        for i in 0..=3 {
            assert_eq!(sat.get(i, 0), 0.0);
            assert_eq!(sat.get(0, i), 0.0);
        }
        assert_eq!(sat.get(1, 1), 1.0);
        assert_eq!(sat.get(3, 1), 6.0);
        assert_eq!(sat.get(2, 2), 12.0);
        assert_eq!(sat.get(3, 2), 21.0);
        assert_eq!(sat.get(1, 3), 12.0);
        assert_eq!(sat.get(2, 3), 27.0);
        assert_eq!(sat.total(), 45.0);
    }

    #[test]
    fn test_sum_region() {
        let sat = three_by_three();

        assert_eq!(sat.sum_region(0, 0, 3, 3), 45.0);
        assert_eq!(sat.sum_region(1, 1, 1, 1), 5.0);
        assert_eq!(sat.sum_region(0, 0, 2, 2), 12.0);
        assert_eq!(sat.sum_region(1, 1, 2, 2), 28.0);
        assert_eq!(sat.sum_region(2, 0, 1, 3), 18.0);
        assert_eq!(sat.sum_region(1, 2, 0, 1), 0.0);
    }

    #[test]
    fn test_trait_based_create_summed_area_table() {
        let image: Image<Luma<f32>> =
            ImageBuffer::from_fn(3, 3, |x, y| Luma([(y * 3 + x + 1) as f32]));
        assert_eq!(image.create_summed_area_table(), three_by_three());

        let grid = SaliencyGrid::from_raw(
            3,
            3,
            1.0,
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        )
        .unwrap();
        assert_eq!(build_integral(&grid), three_by_three());
    }

    #[test]
    fn test_checked_sum_region_rejects_out_of_range() {
        let sat = three_by_three();

        assert_eq!(sat.checked_sum_region(0, 0, 3, 3), Ok(45.0));
        assert_eq!(
            sat.checked_sum_region(1, 0, 3, 1),
            Err(SmartCropError::IndexOutOfRange {
                x: 1,
                y: 0,
                width: 3,
                height: 1,
                table_width: 3,
                table_height: 3,
            })
        );
        assert!(sat.checked_sum_region(0, u32::MAX, 1, 2).is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside 3x3 table")]
    fn test_sum_region_asserts_in_debug_builds() {
        let _ = three_by_three().sum_region(2, 2, 2, 1);
    }
}
