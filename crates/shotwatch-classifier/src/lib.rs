//! Gunshot classification layer for shotwatch
//!
//! Provides the `Classifier` seam, the fixed preprocessing pipeline that
//! turns a raw clip into model input, the ONNX-backed engine, detection
//! persistence, and the analysis worker that ties them together.

pub mod error;
pub mod mock;
pub mod onnx;
pub mod preprocess;
pub mod processor;
pub mod recorder;
pub mod types;

pub use error::{ClassifierError, RecorderError};
pub use onnx::OnnxClassifier;
pub use preprocess::Preprocessor;
pub use processor::ClassifierProcessor;
pub use recorder::DetectionRecorder;
pub use types::{ClassifierConfig, DetectionEvent, Scores};

/// Interface for two-class gunshot models.
///
/// Implementations receive a preprocessed mono buffer at
/// `model_rate_hz()` with exactly `input_width()` samples and return the
/// class probability vector for it.
pub trait Classifier: Send {
    fn classify(&mut self, samples: &[i16]) -> Result<Scores, ClassifierError>;
    fn model_rate_hz(&self) -> u32;
    fn input_width(&self) -> usize;
}
