pub mod config;
pub mod constants;
pub mod gate;
pub mod level;
pub mod types;

pub use config::GateConfig;
pub use constants::DEFAULT_GATE_THRESHOLD;
pub use gate::AmplitudeGate;
pub use level::LevelMeter;
pub use types::GateDecision;
