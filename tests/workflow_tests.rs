//! Integration tests for imageops-smartcrop workflows
//!
//! These tests verify that the public operations compose the way callers
//! use them: analyse once and crop many times, feed detector output in,
//! hand the result to an image renderer.

use image::{DynamicImage, GenericImageView, Luma, Rgb, Rgba};
use imageops_smartcrop::{
    build_integral, estimate_saliency, find_best_crop, to_grid_space, to_source_space,
    CropAnalysis, CropOptions, EstimateSaliency, Image, Point, Rect, SmartCrop, SourceSpace,
    TargetSize,
};

/// Test helper to create a textured image with a bright block
fn create_test_image(width: u32, height: u32) -> Image<Rgb<u8>> {
    Image::from_fn(width, height, |x, y| {
        if (width * 3 / 5..width * 4 / 5).contains(&x) && (height / 5..height * 2 / 5).contains(&y)
        {
            Rgb([240, 230, 220])
        } else {
            Rgb([((x / 7 + y / 11) % 2 * 20) as u8, 40, 60])
        }
    })
}

#[test]
fn cached_analysis_matches_one_shot_crops() {
    let image = create_test_image(640, 360);
    let analysis = CropAnalysis::new(&image, &CropOptions::default()).unwrap();

    for (tw, th) in [(1, 1), (4, 3), (9, 16), (21, 9), (300, 100)] {
        let cached = analysis.find_crop(TargetSize::new(tw, th).unwrap(), &[]);
        let fresh = find_best_crop(&image, tw, th, &[]).unwrap();
        assert_eq!(cached, fresh, "{tw}x{th}");
    }
}

#[test]
fn extension_trait_matches_free_function() {
    let image = create_test_image(320, 240);
    let region = Rect::new(10, 10, 50, 50);

    assert_eq!(
        image.smart_crop(3, 4, &[region]).unwrap(),
        find_best_crop(&image, 3, 4, &[region]).unwrap()
    );
}

#[test]
fn detector_rectangles_are_accepted() {
    let image = create_test_image(500, 300);
    let detections = [
        imageproc::rect::Rect::at(30, 40).of_size(60, 60),
        imageproc::rect::Rect::at(120, 200).of_size(40, 50),
    ];
    let regions: Vec<Rect<SourceSpace>> = detections.iter().copied().map(Rect::from).collect();

    let crop = image.smart_crop(1, 1, &regions).unwrap();
    for region in &regions {
        assert!(crop.contains(region), "{region:?} not in {crop:?}");
    }

    // The result can go straight back to an imageproc consumer.
    let rendered: imageproc::rect::Rect = crop.into();
    assert_eq!(rendered.width(), crop.width);
    assert_eq!(rendered.left(), crop.x as i32);
}

#[test]
fn crop_region_can_drive_a_sub_image_view() {
    let image = create_test_image(200, 100);
    let crop = image.smart_crop(1, 1, &[]).unwrap();

    let view = image.view(crop.x, crop.y, crop.width, crop.height);
    assert_eq!(view.dimensions(), (100, 100));
}

#[test]
fn dynamic_and_high_depth_images_are_supported() {
    let rgb = create_test_image(160, 120);
    let dynamic = DynamicImage::ImageRgb8(rgb.clone());
    assert_eq!(
        dynamic.smart_crop(1, 1, &[]).unwrap(),
        rgb.smart_crop(1, 1, &[]).unwrap()
    );

    let rgba: Image<Rgba<u8>> = Image::from_fn(64, 64, |x, _| Rgba([0, 0, (x * 4) as u8, 10]));
    assert!(rgba.smart_crop(2, 1, &[]).is_ok());

    let deep: Image<Luma<u16>> = Image::from_fn(64, 64, |x, y| Luma([((x * y) % 997) as u16 * 60]));
    let grid = deep.estimate_saliency(32).unwrap();
    assert_eq!((grid.width(), grid.height()), (32, 32));
}

#[test]
fn saliency_and_integral_compose() {
    let image = create_test_image(300, 200);
    let grid = estimate_saliency(&image, 100).unwrap();
    let table = build_integral(&grid);

    let total: f64 = grid.data().iter().map(|&v| f64::from(v)).sum();
    assert!((table.total() - total).abs() < 1e-6 * total.max(1.0));
    assert_eq!((table.width(), table.height()), (grid.width(), grid.height()));
}

#[test]
fn options_change_search_granularity() {
    let image = create_test_image(400, 400);
    let coarse = CropAnalysis::new(&image, &CropOptions::new().set_step_fraction(0.5)).unwrap();
    let fine = CropAnalysis::new(&image, &CropOptions::new().set_max_size(100)).unwrap();
    let target = TargetSize::new(1, 2).unwrap();

    let coarse_plan = coarse.plan(target, &[]);
    let fine_plan = fine.plan(target, &[]);
    assert_eq!((coarse_plan.window_width, coarse_plan.step_x), (100, 50));
    assert_eq!((fine_plan.window_width, fine_plan.step_x), (50, 3));
    assert_eq!(fine.grid().width(), 100);
}

#[test]
fn coordinate_mapping_round_trips_grid_origins() {
    let image = create_test_image(800, 600);
    let grid = image.estimate_saliency(200).unwrap();
    let scale = grid.scale();

    let source = to_source_space(Point::new(37, 12), scale);
    assert_eq!((source.x, source.y), (148, 48));
    let back = to_grid_space(source, scale);
    assert_eq!((back.x, back.y), (37, 12));
}
