use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};

use super::capture::DeviceConfig;
use super::constants::{CLIP_DURATION_SECS, FRAMES_PER_BUFFER};
use super::frame_reader::FrameReader;
use shotwatch_gate::{AmplitudeGate, GateConfig};
use shotwatch_telemetry::{FpsTracker, PipelineMetrics, PipelineStage};

/// One fixed-duration mono clip, owned by exactly one stage at a time.
/// Ownership moves into the analysis channel on admission; the clip is
/// never touched again by the capture side.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub timestamp: std::time::Instant,
    /// Peak absolute amplitude, measured once at assembly.
    pub peak: i16,
}

impl AudioClip {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

pub struct ClipConfig {
    pub clip_duration_secs: u32,
    pub gate: GateConfig,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            clip_duration_secs: CLIP_DURATION_SECS,
            gate: GateConfig::default(),
        }
    }
}

/// Assembles ring-buffer frames into fixed-duration clips and applies
/// the amplitude gate before handing them to the analysis channel.
pub struct ClipAssembler {
    frame_reader: FrameReader,
    output_tx: mpsc::Sender<AudioClip>,
    cfg: ClipConfig,
    running: Arc<AtomicBool>,
    metrics: Option<Arc<PipelineMetrics>>,
    device_cfg_rx: Option<broadcast::Receiver<DeviceConfig>>,
}

impl ClipAssembler {
    pub fn new(
        frame_reader: FrameReader,
        output_tx: mpsc::Sender<AudioClip>,
        cfg: ClipConfig,
    ) -> Self {
        Self {
            frame_reader,
            output_tx,
            cfg,
            running: Arc::new(AtomicBool::new(false)),
            metrics: None,
            device_cfg_rx: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_device_config(mut self, rx: broadcast::Receiver<DeviceConfig>) -> Self {
        self.device_cfg_rx = Some(rx);
        self
    }

    pub fn spawn(self, initial: DeviceConfig) -> JoinHandle<()> {
        let mut worker = AssemblerWorker::new(
            self.frame_reader,
            self.output_tx,
            self.cfg,
            initial,
            self.metrics,
            self.device_cfg_rx,
        );
        self.running.store(true, Ordering::SeqCst);
        let running = self.running.clone();

        tokio::spawn(async move {
            worker.run(running).await;
        })
    }
}

struct AssemblerWorker {
    frame_reader: FrameReader,
    output_tx: mpsc::Sender<AudioClip>,
    cfg: ClipConfig,
    gate: AmplitudeGate,
    buffer: VecDeque<i16>,
    input_rate: u32,
    input_channels: u16,
    clip_samples: usize,
    samples_emitted: u64,
    metrics: Option<Arc<PipelineMetrics>>,
    capture_fps_tracker: FpsTracker,
    clip_fps_tracker: FpsTracker,
    device_cfg_rx: Option<broadcast::Receiver<DeviceConfig>>,
    start_time: std::time::Instant,
}

impl AssemblerWorker {
    fn new(
        frame_reader: FrameReader,
        output_tx: mpsc::Sender<AudioClip>,
        cfg: ClipConfig,
        initial: DeviceConfig,
        metrics: Option<Arc<PipelineMetrics>>,
        device_cfg_rx: Option<broadcast::Receiver<DeviceConfig>>,
    ) -> Self {
        let clip_samples = (initial.sample_rate * cfg.clip_duration_secs) as usize;
        let gate = AmplitudeGate::new(cfg.gate);
        Self {
            frame_reader,
            output_tx,
            cfg,
            gate,
            buffer: VecDeque::with_capacity(clip_samples * 2),
            input_rate: initial.sample_rate,
            input_channels: initial.channels,
            clip_samples,
            samples_emitted: 0,
            metrics,
            capture_fps_tracker: FpsTracker::new(),
            clip_fps_tracker: FpsTracker::new(),
            device_cfg_rx,
            start_time: std::time::Instant::now(),
        }
    }

    async fn run(&mut self, running: Arc<AtomicBool>) {
        tracing::info!(
            "Clip assembler started ({}s clips, gate threshold {})",
            self.cfg.clip_duration_secs,
            self.gate.threshold()
        );

        while running.load(Ordering::SeqCst) {
            // Apply device config updates before reading more frames
            let mut pending_cfgs = Vec::new();
            if let Some(rx) = &mut self.device_cfg_rx {
                while let Ok(cfg) = rx.try_recv() {
                    pending_cfgs.push(cfg);
                }
            }
            for cfg in pending_cfgs {
                self.frame_reader
                    .update_device_config(cfg.sample_rate, cfg.channels);
                self.reconfigure_for_device(&cfg);
            }

            if let Some(frame) = self.frame_reader.read_frame(FRAMES_PER_BUFFER) {
                if let Some(m) = &self.metrics {
                    m.increment_capture_frames();
                    if let Some(fps) = self.capture_fps_tracker.tick() {
                        m.update_capture_fps(fps);
                    }
                    m.update_audio_level(&frame.samples);
                    m.mark_stage_active(PipelineStage::Capture);
                }

                if self.input_rate != frame.sample_rate || self.input_channels != frame.channels {
                    self.reconfigure_for_device(&DeviceConfig {
                        sample_rate: frame.sample_rate,
                        channels: frame.channels,
                    });
                }

                let mono = downmix(&frame.samples, frame.channels);
                self.buffer.extend(mono);
                self.flush_ready_clips();
            } else {
                // Poll at 40Hz while the ring buffer is empty; a 100ms
                // capture buffer refills well within that.
                time::sleep(Duration::from_millis(25)).await;
            }
        }

        tracing::info!("Clip assembler stopped");
    }

    fn flush_ready_clips(&mut self) {
        while self.buffer.len() >= self.clip_samples {
            let samples: Vec<i16> = self.buffer.drain(..self.clip_samples).collect();

            let timestamp_ms = self.samples_emitted * 1000 / self.input_rate as u64;
            let timestamp = self.start_time + std::time::Duration::from_millis(timestamp_ms);
            self.samples_emitted += self.clip_samples as u64;

            let decision = self.gate.evaluate(&samples);
            if let Some(m) = &self.metrics {
                m.clips_assembled.fetch_add(1, Ordering::Relaxed);
                if let Some(fps) = self.clip_fps_tracker.tick() {
                    m.update_clip_fps(fps);
                }
                m.mark_stage_active(PipelineStage::Clip);
            }

            if !decision.is_admitted() {
                tracing::debug!(
                    "Clip below gate threshold (peak {} < {}), not enqueued",
                    decision.peak(),
                    self.gate.threshold()
                );
                if let Some(m) = &self.metrics {
                    m.clips_rejected.fetch_add(1, Ordering::Relaxed);
                }
                continue;
            }

            let clip = AudioClip {
                samples,
                sample_rate: self.input_rate,
                timestamp,
                peak: decision.peak(),
            };

            tracing::debug!(
                "Clip admitted (peak {}), handing to analysis",
                decision.peak()
            );

            match self.output_tx.try_send(clip) {
                Ok(()) => {
                    if let Some(m) = &self.metrics {
                        m.clips_admitted.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    // Analysis is behind; shed the newest clip rather than
                    // queue stale audio without bound
                    tracing::warn!("Analysis channel full, shedding clip");
                    if let Some(m) = &self.metrics {
                        m.clips_shed.fetch_add(1, Ordering::Relaxed);
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::warn!("Analysis channel closed, dropping clip");
                }
            }
        }
    }

    fn reconfigure_for_device(&mut self, cfg: &DeviceConfig) {
        tracing::info!(
            "Clip assembler reconfigured: {}Hz {}ch -> {}Hz {}ch",
            self.input_rate,
            self.input_channels,
            cfg.sample_rate,
            cfg.channels
        );
        self.input_rate = cfg.sample_rate;
        self.input_channels = cfg.channels;
        self.clip_samples = (cfg.sample_rate * self.cfg.clip_duration_secs) as usize;
        // A partially assembled clip spans two device configs; discard it
        self.buffer.clear();
    }
}

/// Average interleaved channels down to mono. Mono input is returned
/// as-is.
fn downmix(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks_exact(channels)
        .map(|chunk| {
            let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring_buffer::AudioRingBuffer;

    fn test_worker(
        threshold: i16,
        rate: u32,
        channels: u16,
        capacity: usize,
    ) -> (
        AssemblerWorker,
        crate::ring_buffer::AudioProducer,
        mpsc::Receiver<AudioClip>,
    ) {
        let rb = AudioRingBuffer::new(1 << 20);
        let (prod, cons) = rb.split();
        let reader = FrameReader::new(cons, rate, channels);
        let (tx, rx) = mpsc::channel(capacity);
        let cfg = ClipConfig {
            clip_duration_secs: 2,
            gate: GateConfig { threshold },
        };
        let worker = AssemblerWorker::new(
            reader,
            tx,
            cfg,
            DeviceConfig {
                sample_rate: rate,
                channels,
            },
            None,
            None,
        );
        (worker, prod, rx)
    }

    #[test]
    fn stereo_downmix_averages_pairs() {
        let samples = vec![1000i16, -1000, 900, -900, 800, -800, 700, -700];
        assert_eq!(downmix(&samples, 2), vec![0, 0, 0, 0]);
    }

    #[test]
    fn mono_downmix_is_identity() {
        let samples = vec![5i16, -5, 10];
        assert_eq!(downmix(&samples, 1), samples);
    }

    #[test]
    fn quiet_clip_is_not_enqueued() {
        let (mut worker, _prod, mut rx) = test_worker(1000, 100, 1, 4);
        // Two seconds at 100Hz = 200 samples, all below threshold
        worker.buffer.extend(std::iter::repeat_n(999i16, 200));
        worker.flush_ready_clips();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn loud_clip_is_enqueued_exactly_once() {
        let (mut worker, _prod, mut rx) = test_worker(1000, 100, 1, 4);
        worker.buffer.extend(std::iter::repeat_n(0i16, 199));
        worker.buffer.push_back(1000);
        worker.flush_ready_clips();
        let clip = rx.try_recv().expect("clip should be admitted");
        assert_eq!(clip.samples.len(), 200);
        assert_eq!(clip.peak, 1000);
        assert!(rx.try_recv().is_err(), "exactly one clip per cycle");
    }

    #[test]
    fn partial_clip_stays_buffered() {
        let (mut worker, _prod, mut rx) = test_worker(0, 100, 1, 4);
        worker.buffer.extend(std::iter::repeat_n(2000i16, 150));
        worker.flush_ready_clips();
        assert!(rx.try_recv().is_err());
        assert_eq!(worker.buffer.len(), 150);
    }

    #[test]
    fn full_channel_sheds_newest_clip() {
        let (mut worker, _prod, mut rx) = test_worker(0, 100, 1, 1);
        // Three loud clips into a channel with room for one
        worker.buffer.extend(std::iter::repeat_n(5000i16, 600));
        worker.flush_ready_clips();
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err(), "overflow clips are shed, not queued");
        assert!(worker.buffer.is_empty());
    }

    #[test]
    fn device_change_resets_partial_buffer_and_clip_size() {
        let (mut worker, _prod, _rx) = test_worker(0, 100, 1, 4);
        worker.buffer.extend(std::iter::repeat_n(1i16, 150));
        worker.reconfigure_for_device(&DeviceConfig {
            sample_rate: 200,
            channels: 1,
        });
        assert!(worker.buffer.is_empty());
        assert_eq!(worker.clip_samples, 400);
    }
}
