use crate::config::GateConfig;
use crate::level::LevelMeter;
use crate::types::GateDecision;

/// Admission gate between clip assembly and analysis.
///
/// Admits a clip exactly when its peak absolute amplitude reaches the
/// configured threshold. The gate is stateless across clips apart from
/// bookkeeping counters.
pub struct AmplitudeGate {
    config: GateConfig,
    meter: LevelMeter,
    clips_evaluated: u64,
    clips_admitted: u64,
}

impl AmplitudeGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            meter: LevelMeter::new(),
            clips_evaluated: 0,
            clips_admitted: 0,
        }
    }

    pub fn evaluate(&mut self, samples: &[i16]) -> GateDecision {
        self.clips_evaluated += 1;
        let peak = self.meter.peak(samples);
        if peak >= self.config.threshold {
            self.clips_admitted += 1;
            GateDecision::Admitted { peak }
        } else {
            GateDecision::Rejected { peak }
        }
    }

    pub fn threshold(&self) -> i16 {
        self.config.threshold
    }

    pub fn clips_evaluated(&self) -> u64 {
        self.clips_evaluated
    }

    pub fn clips_admitted(&self) -> u64 {
        self.clips_admitted
    }
}
