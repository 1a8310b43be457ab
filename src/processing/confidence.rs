use tracing::{debug, info, warn};

use crate::models::Detection;

/// Usable score of a detection: present, finite, clamped into [0, 1]
pub fn usable_confidence(detection: &Detection) -> Option<f64> {
    detection
        .confidence
        .map(f64::from)
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
}

/// Weight of a detection: character length of its trimmed text
pub fn text_weight(detection: &Detection) -> f64 {
    detection.text.trim().chars().count() as f64
}

/// Document-level confidence as a text-length weighted mean.
///
/// Detections without a usable score are left out of both sums. Returns
/// exactly 0.0 when nothing carries weight.
pub fn aggregate(detections: &[Detection]) -> f64 {
    if detections.is_empty() {
        warn!("No results to calculate confidence from");
        return 0.0;
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    let mut usable = 0usize;

    for (idx, detection) in detections.iter().enumerate() {
        let Some(confidence) = usable_confidence(detection) else {
            warn!("Detection {} missing confidence score", idx);
            continue;
        };
        usable += 1;

        let weight = text_weight(detection);
        debug!("Detection {}: confidence={:.4} weight={}", idx, confidence, weight);
        weighted_sum += confidence * weight;
        total_weight += weight;
    }

    if usable == 0 {
        warn!("No valid confidence scores found");
        return 0.0;
    }
    if total_weight == 0.0 {
        warn!("No valid text found for confidence calculation");
        return 0.0;
    }

    let confidence = (weighted_sum / total_weight).clamp(0.0, 1.0);
    info!("Final calculated confidence: {:.4}", confidence);
    confidence
}
