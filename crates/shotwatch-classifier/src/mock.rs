//! Scripted classifier for pipeline tests

use crate::error::ClassifierError;
use crate::types::Scores;
use crate::Classifier;

/// Returns a scripted sequence of score vectors; the last entry repeats
/// once the script runs out. Optionally starts failing after N calls to
/// exercise worker error paths.
pub struct MockClassifier {
    script: Vec<Scores>,
    calls: usize,
    fail_after_calls: Option<usize>,
    model_rate: u32,
    input_width: usize,
}

impl MockClassifier {
    pub fn with_scores(script: Vec<Scores>) -> Self {
        assert!(!script.is_empty(), "script must contain at least one entry");
        Self {
            script,
            calls: 0,
            fail_after_calls: None,
            model_rate: 22_050,
            input_width: 44_100,
        }
    }

    pub fn always(scores: Scores) -> Self {
        Self::with_scores(vec![scores])
    }

    pub fn failing_after(mut self, calls: usize) -> Self {
        self.fail_after_calls = Some(calls);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Classifier for MockClassifier {
    fn classify(&mut self, _samples: &[i16]) -> Result<Scores, ClassifierError> {
        self.calls += 1;
        if let Some(limit) = self.fail_after_calls {
            if self.calls > limit {
                return Err(ClassifierError::Inference("simulated failure".to_string()));
            }
        }
        let idx = (self.calls - 1).min(self.script.len() - 1);
        Ok(self.script[idx])
    }

    fn model_rate_hz(&self) -> u32 {
        self.model_rate
    }

    fn input_width(&self) -> usize {
        self.input_width
    }
}
