use std::fmt;
use std::marker::PhantomData;

/// Marker for coordinates in the original, full-resolution image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSpace;

/// Marker for coordinates in the downsampled saliency grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridSpace;

/// Uniform factor relating the two spaces: `grid = source * scale`
///
/// The factor is always in `(0, 1]`; the saliency grid is never larger
/// than the image it was built from.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Scale(f64);

impl Scale {
    /// Wraps a grid/source factor. Returns `None` for non-finite or non-positive values.
    #[must_use]
    pub fn new(factor: f64) -> Option<Self> {
        (factor.is_finite() && factor > 0.0).then_some(Self(factor))
    }

    #[must_use]
    pub const fn factor(self) -> f64 {
        self.0
    }

    /// Converts a source-space length to grid space, never below one pixel.
    #[must_use]
    pub fn to_grid_length(self, length: u32) -> u32 {
        round_to_u32(f64::from(length) * self.0).max(1)
    }

    /// Converts a grid-space length to source space, never below one pixel.
    #[must_use]
    pub fn to_source_length(self, length: u32) -> u32 {
        round_to_u32(f64::from(length) / self.0).max(1)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}

/// A point tagged with the coordinate space it lives in
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Point<S> {
    pub x: i32,
    pub y: i32,
    space: PhantomData<S>,
}

impl<S> Point<S> {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }
}

impl<S> Clone for Point<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Point<S> {}

/// Axis-aligned rectangle tagged with its coordinate space
///
/// The origin is signed so that detector boxes partially outside the frame
/// can be represented; the size is always non-negative.
#[derive(PartialEq, Eq, Hash)]
pub struct Rect<S> {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    space: PhantomData<S>,
}

impl<S> Rect<S> {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            space: PhantomData,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> Point<S> {
        Point::new(self.x, self.y)
    }

    /// Exclusive right edge
    #[must_use]
    pub fn right(&self) -> i64 {
        i64::from(self.x) + i64::from(self.width)
    }

    /// Exclusive bottom edge
    #[must_use]
    pub fn bottom(&self) -> i64 {
        i64::from(self.y) + i64::from(self.height)
    }

    /// Returns `true` when `other` lies entirely inside `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// Clips the rectangle to `[0, width) x [0, height)`.
    ///
    /// A rectangle entirely outside the bounds collapses to a one pixel
    /// rectangle on the nearest edge, so the result is never empty.
    #[must_use]
    pub fn clip_to(&self, width: u32, height: u32) -> Self {
        let (x, w) = clip_span(i64::from(self.x), self.right(), width);
        let (y, h) = clip_span(i64::from(self.y), self.bottom(), height);
        Self::new(x, y, w, h)
    }
}

fn clip_span(start: i64, end: i64, limit: u32) -> (i32, u32) {
    let limit = i64::from(limit.max(1));
    let start = start.clamp(0, limit - 1);
    let end = end.clamp(start + 1, limit);
    // Both bounds lie in [0, u32::MAX] here.
    (start as i32, (end - start) as u32)
}

impl<S> Clone for Rect<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Rect<S> {}

impl<S> fmt::Debug for Rect<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rect")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl From<imageproc::rect::Rect> for Rect<SourceSpace> {
    fn from(rect: imageproc::rect::Rect) -> Self {
        Self::new(rect.left(), rect.top(), rect.width(), rect.height())
    }
}

impl Rect<SourceSpace> {
    /// Converts to grid space: origin and size are each rounded after scaling.
    #[must_use]
    pub fn to_grid_space(&self, scale: Scale) -> Rect<GridSpace> {
        let origin = to_grid_space(self.origin(), scale);
        Rect::new(
            origin.x,
            origin.y,
            scale.to_grid_length(self.width),
            scale.to_grid_length(self.height),
        )
    }
}

impl Rect<GridSpace> {
    #[must_use]
    pub fn to_source_space(&self, scale: Scale) -> Rect<SourceSpace> {
        let origin = to_source_space(self.origin(), scale);
        Rect::new(
            origin.x,
            origin.y,
            scale.to_source_length(self.width),
            scale.to_source_length(self.height),
        )
    }
}

/// Maps a grid-space point back to the source image: `round(p / scale)` per axis.
#[must_use]
pub fn to_source_space(point: Point<GridSpace>, scale: Scale) -> Point<SourceSpace> {
    Point::new(
        round_to_i32(f64::from(point.x) / scale.0),
        round_to_i32(f64::from(point.y) / scale.0),
    )
}

/// Maps a source-space point into the saliency grid: `round(p * scale)` per axis.
#[must_use]
pub fn to_grid_space(point: Point<SourceSpace>, scale: Scale) -> Point<GridSpace> {
    Point::new(
        round_to_i32(f64::from(point.x) * scale.0),
        round_to_i32(f64::from(point.y) * scale.0),
    )
}

/// Rounds half away from zero and saturates into the `u32` range.
#[inline]
pub(crate) fn round_to_u32(value: f64) -> u32 {
    // `as` saturates and maps NaN to zero.
    value.round() as u32
}

#[inline]
fn round_to_i32(value: f64) -> i32 {
    value.round() as i32
}
