//! Comprehensive amplitude gate tests
//!
//! Tests cover:
//! - Level metering (peak, RMS, dBFS)
//! - Admission decisions across the threshold boundary
//! - Gate bookkeeping counters

use shotwatch_gate::config::GateConfig;
use shotwatch_gate::constants::DEFAULT_GATE_THRESHOLD;
use shotwatch_gate::gate::AmplitudeGate;
use shotwatch_gate::level::LevelMeter;
use shotwatch_gate::types::GateDecision;

// ─── Level Meter Tests ───────────────────────────────────────────────

#[test]
fn level_silence_is_very_low_dbfs() {
    let meter = LevelMeter::new();
    let silence = vec![0i16; 4410];
    let db = meter.calculate_dbfs(&silence);
    assert!(db <= -100.0, "silence should be <= -100 dBFS, got {}", db);
}

#[test]
fn level_full_scale_near_zero_dbfs() {
    let meter = LevelMeter::new();
    let full = vec![i16::MAX; 4410];
    let db = meter.calculate_dbfs(&full);
    assert!(
        (db - 0.0).abs() < 0.1,
        "full scale should be ~0 dBFS, got {}",
        db
    );
}

#[test]
fn level_rms_empty_frame_returns_zero() {
    let meter = LevelMeter::new();
    let empty: Vec<i16> = vec![];
    assert_eq!(meter.calculate_rms(&empty), 0.0);
}

#[test]
fn level_dbfs_monotonically_increases_with_amplitude() {
    let meter = LevelMeter::new();
    let mut prev_db = f32::NEG_INFINITY;

    for amplitude in [100, 500, 1000, 5000, 10000, 20000, 30000] {
        let frame = vec![amplitude as i16; 4410];
        let db = meter.calculate_dbfs(&frame);
        assert!(
            db > prev_db,
            "dBFS should increase with amplitude: {} dB at amplitude {}",
            db,
            amplitude
        );
        prev_db = db;
    }
}

#[test]
fn level_peak_is_absolute() {
    let meter = LevelMeter::new();
    assert_eq!(meter.peak(&[0, -1500, 200]), 1500);
    assert_eq!(meter.peak(&[]), 0);
}

// ─── Gate Decision Tests ─────────────────────────────────────────────

#[test]
fn gate_rejects_below_threshold() {
    let mut gate = AmplitudeGate::new(GateConfig { threshold: 1000 });
    let quiet = vec![999i16; 88_200];
    let decision = gate.evaluate(&quiet);
    assert_eq!(decision, GateDecision::Rejected { peak: 999 });
    assert!(!decision.is_admitted());
}

#[test]
fn gate_admits_at_exact_threshold() {
    // The boundary is inclusive: a peak equal to the threshold admits.
    let mut gate = AmplitudeGate::new(GateConfig { threshold: 1000 });
    let mut clip = vec![0i16; 88_200];
    clip[441] = 1000;
    let decision = gate.evaluate(&clip);
    assert_eq!(decision, GateDecision::Admitted { peak: 1000 });
}

#[test]
fn gate_admits_above_threshold() {
    let mut gate = AmplitudeGate::new(GateConfig::default());
    let loud = vec![20_000i16; 88_200];
    assert!(gate.evaluate(&loud).is_admitted());
}

#[test]
fn gate_admits_negative_going_transient() {
    // A gunshot transient can swing negative first; the gate must use
    // absolute amplitude.
    let mut gate = AmplitudeGate::new(GateConfig { threshold: 1000 });
    let mut clip = vec![0i16; 88_200];
    clip[0] = -1200;
    assert!(gate.evaluate(&clip).is_admitted());
}

#[test]
fn gate_rejects_silence() {
    let mut gate = AmplitudeGate::new(GateConfig::default());
    let silence = vec![0i16; 88_200];
    assert!(!gate.evaluate(&silence).is_admitted());
}

#[test]
fn gate_default_threshold_matches_constant() {
    let gate = AmplitudeGate::new(GateConfig::default());
    assert_eq!(gate.threshold(), DEFAULT_GATE_THRESHOLD);
}

#[test]
fn gate_counts_evaluations_and_admissions() {
    let mut gate = AmplitudeGate::new(GateConfig { threshold: 1000 });
    gate.evaluate(&[0i16; 64]);
    gate.evaluate(&[5000i16; 64]);
    gate.evaluate(&[999i16; 64]);
    assert_eq!(gate.clips_evaluated(), 3);
    assert_eq!(gate.clips_admitted(), 1);
}

#[test]
fn decision_exposes_measured_peak() {
    let mut gate = AmplitudeGate::new(GateConfig { threshold: 1000 });
    let decision = gate.evaluate(&[-300i16, 250]);
    assert_eq!(decision.peak(), 300);
}
