use docscan::error::{PipelineError, Result};
use docscan::{Config, Detection, DocumentPipeline, SharedRecognizer, TextRecognizer};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Records every call and returns canned detections
#[derive(Default)]
pub struct MockRecognizer {
    pub detections: Vec<Detection>,
    pub failure: Option<String>,
    /// Dimensions of every image passed in
    pub seen: Arc<Mutex<Vec<(u32, u32)>>>,
    /// Pixel values of every image passed in were 0 or 255
    pub all_binary: Arc<Mutex<Vec<bool>>>,
    pub in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
    pub delay: Option<Duration>,
}

impl MockRecognizer {
    pub fn returning(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Default::default()
        }
    }
}

impl TextRecognizer for MockRecognizer {
    fn name(&self) -> &str {
        "mock"
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<Detection>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        self.seen.lock().unwrap().push(image.dimensions());
        self.all_binary
            .lock()
            .unwrap()
            .push(image.pixels().all(|p| p[0] == 0 || p[0] == 255));

        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.failure {
            Some(message) => Err(PipelineError::Recognition(message.clone())),
            None => Ok(self.detections.clone()),
        }
    }
}

pub fn pipeline_with(recognizer: MockRecognizer) -> DocumentPipeline {
    DocumentPipeline::new(SharedRecognizer::new(recognizer), Config::default())
}

pub fn detection(text: &str, confidence: Option<f32>) -> Detection {
    Detection::from_rect(10.0, 10.0, 50.0, 30.0, text, confidence)
}

/// High-contrast 8px checkerboard, sharp edges everywhere
pub fn sharp_image(width: u32, height: u32) -> DynamicImage {
    let img = GrayImage::from_fn(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });
    DynamicImage::ImageLuma8(img)
}

/// Featureless white page
pub fn white_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])))
}

pub fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, format).expect("Failed to encode test image");
    buffer.into_inner()
}

pub fn png_bytes(img: &DynamicImage) -> Vec<u8> {
    encode(img, ImageFormat::Png)
}
