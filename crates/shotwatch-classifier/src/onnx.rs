//! ONNX Runtime backend for the gunshot model
//!
//! Loads a two-class 1D-CNN exported to ONNX. The model takes a
//! `[1, width, 1]` f32 tensor of raw amplitude values and returns a
//! `[1, 2]` softmax vector (ambient, gunshot).

use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use tracing::{debug, info};

use crate::error::ClassifierError;
use crate::types::Scores;
use crate::Classifier;

pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    output_name: String,
    model_rate: u32,
    input_width: usize,
}

impl OnnxClassifier {
    pub fn new(
        model_path: &Path,
        model_rate: u32,
        input_width: usize,
    ) -> Result<Self, ClassifierError> {
        info!("Loading gunshot model from {:?}", model_path);

        // commit() returns bool in ort 2.0; re-initialization is a no-op
        let _ = ort::init().with_name("shotwatch").commit();

        let session = Session::builder()
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to set optimization level: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to load model: {}", e)))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| ClassifierError::ModelLoad("Model has no inputs".to_string()))?;
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| ClassifierError::ModelLoad("Model has no outputs".to_string()))?;

        info!(
            "Gunshot model loaded (input '{}', output '{}', width {})",
            input_name, output_name, input_width
        );

        Ok(Self {
            session,
            input_name,
            output_name,
            model_rate,
            input_width,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&mut self, samples: &[i16]) -> Result<Scores, ClassifierError> {
        // The network was trained on raw sample values, so feed i16
        // amplitudes as f32 without rescaling
        let mut data: Vec<f32> = samples.iter().map(|&s| s as f32).collect();
        data.resize(self.input_width, 0.0);

        let tensor = Tensor::from_array(([1usize, self.input_width, 1usize], data))
            .map_err(|e| ClassifierError::Inference(format!("Failed to create input tensor: {}", e)))?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .map_err(|e| ClassifierError::Inference(format!("Model run failed: {}", e)))?;

        let (_, probs) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Failed to extract scores: {}", e)))?;

        if probs.len() < 2 {
            return Err(ClassifierError::BadOutputShape {
                expected: 2,
                got: probs.len(),
            });
        }

        let scores = Scores {
            ambient: probs[0],
            gunshot: probs[1],
        };
        debug!(
            "Class probabilities: ambient={:.4} gunshot={:.4}",
            scores.ambient, scores.gunshot
        );
        Ok(scores)
    }

    fn model_rate_hz(&self) -> u32 {
        self.model_rate
    }

    fn input_width(&self) -> usize {
        self.input_width
    }
}
