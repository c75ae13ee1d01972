//! Test utilities for imageops-smartcrop
//!
//! This module provides image builders shared by the unit tests.
//! It is only compiled when running tests.

use image::Rgb;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::Image;

/// Background used by [`create_square_image`]
pub const BACKGROUND: Rgb<u8> = Rgb([40, 40, 40]);

/// Foreground used by [`create_square_image`]
pub const FOREGROUND: Rgb<u8> = Rgb([250, 250, 250]);

/// Creates an image filled with a single color.
///
/// A flat image has zero saliency everywhere.
pub fn create_flat_image(width: u32, height: u32, color: Rgb<u8>) -> Image<Rgb<u8>> {
    Image::from_pixel(width, height, color)
}

/// Creates a dark image with one bright square.
///
/// # Arguments
/// * `width`, `height` - Image size
/// * `origin` - Top-left corner of the square
/// * `side` - Side length of the square
pub fn create_square_image(
    width: u32,
    height: u32,
    origin: (i32, i32),
    side: u32,
) -> Image<Rgb<u8>> {
    let mut image = create_flat_image(width, height, BACKGROUND);
    draw_filled_rect_mut(
        &mut image,
        Rect::at(origin.0, origin.1).of_size(side, side),
        FOREGROUND,
    );
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_square_image_paints_only_the_square() {
        let image = create_square_image(20, 10, (5, 2), 3);
        assert_eq!(image.dimensions(), (20, 10));
        assert_eq!(image.get_pixel(5, 2), &FOREGROUND);
        assert_eq!(image.get_pixel(7, 4), &FOREGROUND);
        assert_eq!(image.get_pixel(8, 4), &BACKGROUND);
        assert_eq!(image.get_pixel(4, 2), &BACKGROUND);
    }
}
