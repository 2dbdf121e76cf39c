use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicI16, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared metrics for cross-thread pipeline monitoring
#[derive(Clone)]
pub struct PipelineMetrics {
    // Audio level monitoring
    pub current_peak: Arc<AtomicI16>, // Peak sample value in current window
    pub current_rms: Arc<AtomicU64>,  // RMS * 1000 for precision
    pub audio_level_db: Arc<AtomicI16>, // Current level in dB * 10

    // Pipeline stage tracking
    pub stage_capture: Arc<AtomicBool>, // Data reached capture stage
    pub stage_clip: Arc<AtomicBool>,    // Data reached clip assembly stage
    pub stage_classify: Arc<AtomicBool>, // Data reached classifier stage
    pub stage_alert: Arc<AtomicBool>,   // Data reached alert stage

    // Frame rate tracking
    pub capture_fps: Arc<AtomicU64>, // Frames per second * 10
    pub clip_fps: Arc<AtomicU64>,    // Clips per second * 10

    // Event counters
    pub capture_frames: Arc<AtomicU64>,
    pub clips_assembled: Arc<AtomicU64>,
    pub clips_admitted: Arc<AtomicU64>,
    pub clips_rejected: Arc<AtomicU64>,
    pub clips_shed: Arc<AtomicU64>, // Dropped because the analysis channel was full
    pub inferences: Arc<AtomicU64>,
    pub detections: Arc<AtomicU64>,
    pub alerts_dispatched: Arc<AtomicU64>,

    // Error tracking
    pub capture_errors: Arc<AtomicU64>,
    pub classify_errors: Arc<AtomicU64>,
    pub persist_errors: Arc<AtomicU64>,
    pub alert_errors: Arc<AtomicU64>,

    // Activity indicators
    pub last_detection_time: Arc<RwLock<Option<Instant>>>,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self {
            current_peak: Arc::new(AtomicI16::new(0)),
            current_rms: Arc::new(AtomicU64::new(0)),
            audio_level_db: Arc::new(AtomicI16::new(-900)),

            stage_capture: Arc::new(AtomicBool::new(false)),
            stage_clip: Arc::new(AtomicBool::new(false)),
            stage_classify: Arc::new(AtomicBool::new(false)),
            stage_alert: Arc::new(AtomicBool::new(false)),

            capture_fps: Arc::new(AtomicU64::new(0)),
            clip_fps: Arc::new(AtomicU64::new(0)),

            capture_frames: Arc::new(AtomicU64::new(0)),
            clips_assembled: Arc::new(AtomicU64::new(0)),
            clips_admitted: Arc::new(AtomicU64::new(0)),
            clips_rejected: Arc::new(AtomicU64::new(0)),
            clips_shed: Arc::new(AtomicU64::new(0)),
            inferences: Arc::new(AtomicU64::new(0)),
            detections: Arc::new(AtomicU64::new(0)),
            alerts_dispatched: Arc::new(AtomicU64::new(0)),

            capture_errors: Arc::new(AtomicU64::new(0)),
            classify_errors: Arc::new(AtomicU64::new(0)),
            persist_errors: Arc::new(AtomicU64::new(0)),
            alert_errors: Arc::new(AtomicU64::new(0)),

            last_detection_time: Arc::new(RwLock::new(None)),
        }
    }
}

impl PipelineMetrics {
    pub fn update_audio_level(&self, samples: &[i16]) {
        if samples.is_empty() {
            return;
        }

        let peak = samples
            .iter()
            .map(|&s| (s as i32).abs())
            .max()
            .unwrap_or(0)
            .min(i16::MAX as i32) as i16;
        self.current_peak.store(peak, Ordering::Relaxed);

        let sum: i64 = samples.iter().map(|&s| s as i64 * s as i64).sum();
        let rms = ((sum as f64 / samples.len() as f64).sqrt() * 1000.0) as u64;
        self.current_rms.store(rms, Ordering::Relaxed);

        let db = if peak > 0 {
            (20.0 * (peak as f64 / 32768.0).log10() * 10.0) as i16
        } else {
            -900
        };
        self.audio_level_db.store(db, Ordering::Relaxed);
    }

    pub fn mark_stage_active(&self, stage: PipelineStage) {
        match stage {
            PipelineStage::Capture => self.stage_capture.store(true, Ordering::Relaxed),
            PipelineStage::Clip => self.stage_clip.store(true, Ordering::Relaxed),
            PipelineStage::Classify => self.stage_classify.store(true, Ordering::Relaxed),
            PipelineStage::Alert => self.stage_alert.store(true, Ordering::Relaxed),
        }
    }

    pub fn decay_stages(&self) {
        self.stage_capture.store(false, Ordering::Relaxed);
        self.stage_clip.store(false, Ordering::Relaxed);
        self.stage_classify.store(false, Ordering::Relaxed);
        self.stage_alert.store(false, Ordering::Relaxed);
    }

    pub fn update_capture_fps(&self, fps: f64) {
        self.capture_fps.store((fps * 10.0) as u64, Ordering::Relaxed);
    }

    pub fn update_clip_fps(&self, fps: f64) {
        self.clip_fps.store((fps * 10.0) as u64, Ordering::Relaxed);
    }

    pub fn increment_capture_frames(&self) {
        self.capture_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_detection(&self) {
        self.detections.fetch_add(1, Ordering::Relaxed);
        *self.last_detection_time.write() = Some(Instant::now());
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PipelineStage {
    Capture,
    Clip,
    Classify,
    Alert,
}

#[derive(Debug)]
pub struct FpsTracker {
    last_update: Instant,
    frame_count: u64,
}

impl FpsTracker {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed >= Duration::from_secs(1) {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.last_update = Instant::now();
            self.frame_count = 0;
            Some(fps)
        } else {
            None
        }
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_level_tracks_absolute_peak() {
        let m = PipelineMetrics::default();
        m.update_audio_level(&[100, -2000, 300]);
        assert_eq!(m.current_peak.load(Ordering::Relaxed), 2000);
    }

    #[test]
    fn audio_level_handles_i16_min() {
        let m = PipelineMetrics::default();
        m.update_audio_level(&[i16::MIN, 0]);
        assert_eq!(m.current_peak.load(Ordering::Relaxed), 32767);
    }

    #[test]
    fn empty_window_leaves_level_unchanged() {
        let m = PipelineMetrics::default();
        m.update_audio_level(&[500]);
        m.update_audio_level(&[]);
        assert_eq!(m.current_peak.load(Ordering::Relaxed), 500);
    }

    #[test]
    fn stage_flags_set_and_decay() {
        let m = PipelineMetrics::default();
        m.mark_stage_active(PipelineStage::Classify);
        assert!(m.stage_classify.load(Ordering::Relaxed));
        m.decay_stages();
        assert!(!m.stage_classify.load(Ordering::Relaxed));
    }
}
