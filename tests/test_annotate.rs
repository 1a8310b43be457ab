mod common;

use common::{detection, solid_rgb, white_image};
use docscan::processing::annotate::{annotate, confidence_color, encode_png};
use docscan::{Detection, Point};
use image::Rgb;

#[test]
fn test_confidence_color_scales_green() {
    assert_eq!(confidence_color(Some(1.0)), Rgb([0, 255, 0]));
    assert_eq!(confidence_color(Some(0.5)), Rgb([0, 128, 0]));
    assert_eq!(confidence_color(Some(0.0)), Rgb([0, 0, 0]));
    assert_eq!(confidence_color(None), Rgb([0, 0, 0]));
    assert_eq!(confidence_color(Some(2.0)), Rgb([0, 255, 0]));
}

#[test]
fn test_draws_polygon_outline() {
    let original = white_image(80, 60);
    let annotated = annotate(&original, &[detection("word", Some(0.5))]);

    assert_eq!(annotated.dimensions(), (80, 60));
    // Top, bottom, left and right edges of the 10,10 -> 50,30 box
    assert_eq!(*annotated.get_pixel(30, 10), Rgb([0, 128, 0]));
    assert_eq!(*annotated.get_pixel(30, 30), Rgb([0, 128, 0]));
    assert_eq!(*annotated.get_pixel(10, 20), Rgb([0, 128, 0]));
    assert_eq!(*annotated.get_pixel(50, 20), Rgb([0, 128, 0]));
    // Interior untouched
    assert_eq!(*annotated.get_pixel(30, 20), Rgb([255, 255, 255]));
}

#[test]
fn test_missing_confidence_drawn_as_zero() {
    let annotated = annotate(&white_image(80, 60), &[detection("word", None)]);
    assert_eq!(*annotated.get_pixel(30, 10), Rgb([0, 0, 0]));
}

#[test]
fn test_original_is_not_modified() {
    let original = solid_rgb(80, 60, [200, 30, 30]);
    let before = original.to_rgb8();
    let annotated = annotate(&original, &[detection("word", Some(1.0))]);

    assert_eq!(original.to_rgb8(), before);
    assert_eq!(*annotated.get_pixel(30, 10), Rgb([0, 255, 0]));
    assert_eq!(*annotated.get_pixel(70, 50), Rgb([200, 30, 30]));
}

#[test]
fn test_later_detections_overwrite_earlier() {
    let first = detection("a", Some(1.0));
    let second = detection("b", Some(0.0));
    let annotated = annotate(&white_image(80, 60), &[first, second]);
    assert_eq!(*annotated.get_pixel(30, 10), Rgb([0, 0, 0]));
}

#[test]
fn test_rotated_polygon() {
    let diamond = Detection::new(
        [
            Point::new(40.0, 5.0),
            Point::new(70.0, 30.0),
            Point::new(40.0, 55.0),
            Point::new(10.0, 30.0),
        ],
        "rotated",
        Some(1.0),
    );
    let annotated = annotate(&white_image(80, 60), &[diamond]);
    assert_eq!(*annotated.get_pixel(40, 5), Rgb([0, 255, 0]));
    assert_eq!(*annotated.get_pixel(10, 30), Rgb([0, 255, 0]));
    assert_eq!(*annotated.get_pixel(40, 30), Rgb([255, 255, 255]));
}

#[test]
fn test_regions_outside_image_are_clipped() {
    let oversized = Detection::from_rect(-20.0, -20.0, 500.0, 500.0, "edge", Some(1.0));
    let annotated = annotate(&white_image(40, 40), &[oversized]);
    assert_eq!(annotated.dimensions(), (40, 40));
}

#[test]
fn test_encode_png_round_trips_dimensions() {
    let annotated = annotate(&white_image(33, 21), &[]);
    let png = encode_png(&annotated).unwrap();
    assert_eq!(&png[1..4], b"PNG");

    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (33, 21));
}

#[test]
fn test_region_far_outside_image_is_clipped() {
    let original = white_image(40, 40);
    let region = Detection::from_rect(10.0, 10.0, 1.0e7, 30.0, "wide", Some(1.0));
    let annotated = annotate(&original, &[region]);

    // Visible part of the top and left edges is drawn
    assert_eq!(*annotated.get_pixel(35, 10), Rgb([0, 255, 0]));
    assert_eq!(*annotated.get_pixel(10, 20), Rgb([0, 255, 0]));
    // The right edge lies beyond the image
    assert_eq!(*annotated.get_pixel(39, 20), Rgb([255, 255, 255]));
}

#[test]
fn test_non_finite_region_is_skipped() {
    let original = white_image(40, 40);
    let nan = Point::new(f32::NAN, 5.0);
    let region = Detection::new(
        [nan, Point::new(20.0, 5.0), Point::new(20.0, 20.0), nan],
        "bad",
        Some(1.0),
    );
    let annotated = annotate(&original, &[region]);
    assert!(annotated.pixels().all(|p| *p == Rgb([255, 255, 255])));
}
