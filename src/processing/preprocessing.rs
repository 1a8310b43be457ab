use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::{bilateral_filter, gaussian_blur_f32};
use imageproc::morphology::{grayscale_close, grayscale_dilate, grayscale_erode, Mask};

use crate::error::{PipelineError, Result};

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

fn ensure_not_empty(img: &GrayImage, stage: &str) -> Result<()> {
    if img.width() == 0 || img.height() == 0 {
        return Err(PipelineError::Preprocessing(format!(
            "{}: image has zero width or height ({}x{})",
            stage,
            img.width(),
            img.height()
        )));
    }
    Ok(())
}

/// Edge-preserving smoothing over a `diameter`-wide window, weighted by
/// spatial distance (`sigma_space`) and intensity difference (`sigma_color`)
pub fn bilateral_denoise(
    img: &GrayImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<GrayImage> {
    ensure_not_empty(img, "bilateral filter")?;
    if sigma_color <= 0.0 || sigma_space <= 0.0 {
        return Err(PipelineError::Preprocessing(format!(
            "bilateral filter: sigmas must be positive (color={}, space={})",
            sigma_color, sigma_space
        )));
    }
    Ok(bilateral_filter(img, diameter.max(1), sigma_color, sigma_space))
}

/// Square structuring element covering a `kernel`-wide window
fn square_mask(kernel: u32) -> Result<Mask> {
    let radius = u8::try_from(kernel / 2).map_err(|_| {
        PipelineError::Preprocessing(format!("morphology: kernel too large ({})", kernel))
    })?;
    Ok(Mask::square(radius))
}

/// Grayscale dilation with a square structuring element
pub fn dilate(img: &GrayImage, kernel: u32) -> Result<GrayImage> {
    ensure_not_empty(img, "dilate")?;
    Ok(grayscale_dilate(img, &square_mask(kernel)?))
}

/// Grayscale erosion with a square structuring element
pub fn erode(img: &GrayImage, kernel: u32) -> Result<GrayImage> {
    ensure_not_empty(img, "erode")?;
    Ok(grayscale_erode(img, &square_mask(kernel)?))
}

/// Dilate then erode
pub fn close(img: &GrayImage, kernel: u32) -> Result<GrayImage> {
    ensure_not_empty(img, "close")?;
    Ok(grayscale_close(img, &square_mask(kernel)?))
}

/// Gaussian sigma matching a window of `block_size` pixels
pub fn gaussian_sigma_for_block(block_size: u32) -> f32 {
    0.3 * ((block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Local binarization against a Gaussian-weighted neighbourhood mean.
///
/// A pixel becomes white when it is brighter than `mean - offset`, black otherwise.
pub fn adaptive_threshold_gaussian(
    img: &GrayImage,
    block_size: u32,
    offset: i32,
) -> Result<GrayImage> {
    ensure_not_empty(img, "adaptive threshold")?;
    if block_size < 3 || block_size % 2 == 0 {
        return Err(PipelineError::Preprocessing(format!(
            "adaptive threshold: block size must be odd and >= 3, got {}",
            block_size
        )));
    }

    let local_mean = gaussian_blur_f32(img, gaussian_sigma_for_block(block_size));

    let mut output = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let threshold = local_mean.get_pixel(x, y)[0] as i32 - offset;
        let value = if pixel[0] as i32 > threshold { 255 } else { 0 };
        output.put_pixel(x, y, Luma([value]));
    }

    Ok(output)
}

/// Scale factor that brings the larger side down to `max_dimension`,
/// or `None` when the image already fits
pub fn downscale_factor(width: u32, height: u32, max_dimension: u32) -> Option<f64> {
    let larger = width.max(height);
    if larger > max_dimension {
        Some(max_dimension as f64 / larger as f64)
    } else {
        None
    }
}

/// Uniformly shrink an image so neither side exceeds `max_dimension`
pub fn resize_to_fit(img: DynamicImage, max_dimension: u32) -> (DynamicImage, Option<f64>) {
    match downscale_factor(img.width(), img.height(), max_dimension) {
        Some(scale) => {
            let new_w = ((img.width() as f64 * scale).round() as u32).clamp(1, max_dimension);
            let new_h = ((img.height() as f64 * scale).round() as u32).clamp(1, max_dimension);
            let resized = img.resize_exact(new_w, new_h, FilterType::Triangle);
            (resized, Some(scale))
        }
        None => (img, None),
    }
}
