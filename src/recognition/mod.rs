//! Text recognition boundary.
//!
//! The pipeline only sees `TextRecognizer`. The engine behind it is loaded
//! once at startup and shared by every run through a `SharedRecognizer`.

pub mod ocrs_engine;

use image::GrayImage;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::models::Detection;

pub use ocrs_engine::OcrsRecognizer;

/// Turns a preprocessed page into raw detections
pub trait TextRecognizer: Send {
    /// Engine identifier (e.g. "ocrs")
    fn name(&self) -> &str;

    /// Detections in no guaranteed order, with polygons in `image` coordinates.
    /// An empty result means no text was found.
    fn recognize(&self, image: &GrayImage) -> Result<Vec<Detection>>;
}

/// Cloneable handle that serializes calls into a single recognizer
#[derive(Clone)]
pub struct SharedRecognizer {
    inner: Arc<Mutex<Box<dyn TextRecognizer>>>,
}

impl SharedRecognizer {
    pub fn new<R: TextRecognizer + 'static>(recognizer: R) -> Self {
        Self::from_boxed(Box::new(recognizer))
    }

    pub fn from_boxed(recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(recognizer)),
        }
    }

    pub fn recognize(&self, image: &GrayImage) -> Result<Vec<Detection>> {
        let recognizer = self
            .inner
            .lock()
            .map_err(|_| PipelineError::Recognition("recognizer lock poisoned".to_string()))?;
        debug!("Running {} on {}x{}", recognizer.name(), image.width(), image.height());
        recognizer.recognize(image)
    }

    pub fn name(&self) -> String {
        match self.inner.lock() {
            Ok(recognizer) => recognizer.name().to_string(),
            Err(_) => "unavailable".to_string(),
        }
    }
}

impl std::fmt::Debug for SharedRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRecognizer")
            .field("name", &self.name())
            .finish()
    }
}
