use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_GATE_THRESHOLD;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Minimum peak absolute amplitude (raw i16 counts) a clip must
    /// reach to be admitted. The boundary is inclusive: a peak exactly
    /// equal to the threshold admits.
    pub threshold: i16,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_GATE_THRESHOLD,
        }
    }
}
