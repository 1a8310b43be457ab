use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use std::io::Cursor;
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::models::{Detection, Point};

/// Outline thickness in pixels
pub const LINE_THICKNESS: u32 = 2;

/// Outline colour: green scaled by confidence, missing confidence drawn as 0.0
pub fn confidence_color(confidence: Option<f32>) -> Rgb<u8> {
    let c = confidence
        .filter(|c| c.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0);
    Rgb([0, (255.0 * c).round() as u8, 0])
}

/// Draw every detection's polygon onto an RGB copy of `original`
pub fn annotate(original: &DynamicImage, detections: &[Detection]) -> RgbImage {
    let mut output = original.to_rgb8();
    for detection in detections {
        draw_polygon(&mut output, detection, confidence_color(detection.confidence));
    }
    info!("Drew {} bounding boxes", detections.len());
    output
}

fn draw_polygon(img: &mut RgbImage, detection: &Detection, color: Rgb<u8>) {
    let points = &detection.region;
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        warn!("Skipping detection with non-finite region: {:?}", detection.text);
        return;
    }

    // Clamp to one pixel outside the image so off-image edges stay invisible
    // and line length is bounded by the image size
    let max_x = img.width() as f32;
    let max_y = img.height() as f32;
    let clamp = |p: Point| (p.x.clamp(-1.0, max_x), p.y.clamp(-1.0, max_y));

    for i in 0..points.len() {
        let (x1, y1) = clamp(points[i]);
        let (x2, y2) = clamp(points[(i + 1) % points.len()]);

        for t in 0..LINE_THICKNESS {
            let offset = t as f32;
            draw_line_segment_mut(img, (x1 + offset, y1), (x2 + offset, y2), color);
            draw_line_segment_mut(img, (x1, y1 + offset), (x2, y2 + offset), color);
        }
    }
}

/// Encode an RGB image as PNG bytes
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| PipelineError::Encoding(e.to_string()))?;
    Ok(buffer.into_inner())
}
