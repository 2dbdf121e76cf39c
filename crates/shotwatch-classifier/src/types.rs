//! Core types for the classification stage

use std::path::PathBuf;

/// Two-class probability vector from one forward pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scores {
    /// Probability the clip is ambient noise.
    pub ambient: f32,
    /// Probability the clip contains a gunshot.
    pub gunshot: f32,
}

impl Scores {
    /// A classification counts as a detection when the gunshot
    /// probability reaches the threshold; the boundary is inclusive.
    pub fn is_detection(&self, threshold: f32) -> bool {
        self.gunshot >= threshold
    }
}

/// Emitted at most once per positive inference; consumed by the alert
/// worker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionEvent {
    /// Index of the persisted sample pair for this detection.
    pub sample_index: u64,
    /// Positive-class probability that triggered the detection.
    pub confidence: f32,
}

/// Classification stage configuration
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Minimum gunshot probability for a detection (inclusive).
    pub confidence_threshold: f32,
    /// Sample rate the model expects (Hz).
    pub model_rate_hz: u32,
    /// Number of samples in one model input.
    pub input_width: usize,
    /// Peak amplitude the normalization step scales clips to.
    pub normalization_ceiling: i16,
    /// Directory detections are persisted into.
    pub recordings_dir: PathBuf,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/gunshot_sound_model.onnx"),
            confidence_threshold: 0.99,
            model_rate_hz: 22_050,
            input_width: 44_100,
            normalization_ceiling: 16_384,
            recordings_dir: PathBuf::from("recordings"),
        }
    }
}
