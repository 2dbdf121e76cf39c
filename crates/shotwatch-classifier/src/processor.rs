//! Analysis worker
//!
//! Receives admitted clips from the bounded analysis channel, runs the
//! preprocessing pipeline and the model forward pass, and on a positive
//! classification emits a detection event and persists the clip pair.
//! Stage failures are logged and counted; the worker keeps draining its
//! channel until the capture side closes it.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use shotwatch_audio::clip::AudioClip;
use shotwatch_telemetry::{PipelineMetrics, PipelineStage};

use crate::preprocess::Preprocessor;
use crate::recorder::DetectionRecorder;
use crate::types::{ClassifierConfig, DetectionEvent};
use crate::{Classifier, RecorderError};

pub struct ClassifierProcessor<C: Classifier> {
    clip_rx: mpsc::Receiver<AudioClip>,
    detection_tx: mpsc::Sender<DetectionEvent>,
    classifier: C,
    preprocessor: Preprocessor,
    recorder: DetectionRecorder,
    confidence_threshold: f32,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl<C: Classifier> ClassifierProcessor<C> {
    pub fn new(
        clip_rx: mpsc::Receiver<AudioClip>,
        detection_tx: mpsc::Sender<DetectionEvent>,
        classifier: C,
        config: &ClassifierConfig,
    ) -> Result<Self, RecorderError> {
        let preprocessor = Preprocessor::new(
            classifier.model_rate_hz(),
            classifier.input_width(),
            config.normalization_ceiling,
        );
        let recorder = DetectionRecorder::new(&config.recordings_dir)?;

        Ok(Self {
            clip_rx,
            detection_tx,
            classifier,
            preprocessor,
            recorder,
            confidence_threshold: config.confidence_threshold,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn run(mut self) {
        info!(
            "Classifier worker started (confidence threshold {}, next sample #{})",
            self.confidence_threshold,
            self.recorder.next_index()
        );

        while let Some(clip) = self.clip_rx.recv().await {
            self.handle_clip(clip);
        }

        info!("Classifier worker shutting down: analysis channel closed");
    }

    fn handle_clip(&mut self, clip: AudioClip) {
        if let Some(m) = &self.metrics {
            m.mark_stage_active(PipelineStage::Classify);
        }

        let processed = self.preprocessor.process(&clip.samples, clip.sample_rate);

        let scores = match self.classifier.classify(&processed) {
            Ok(scores) => scores,
            Err(e) => {
                error!("Inference failed: {}", e);
                if let Some(m) = &self.metrics {
                    m.classify_errors
                        .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                }
                return;
            }
        };

        if let Some(m) = &self.metrics {
            m.inferences
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
        debug!(
            "Clip scored: ambient={:.4} gunshot={:.4} (peak {})",
            scores.ambient, scores.gunshot, clip.peak
        );

        if !scores.is_detection(self.confidence_threshold) {
            return;
        }

        let event = DetectionEvent {
            sample_index: self.recorder.next_index(),
            confidence: scores.gunshot,
        };
        info!(
            "Gunshot detected (confidence {:.4}, sample #{})",
            event.confidence, event.sample_index
        );
        if let Some(m) = &self.metrics {
            m.record_detection();
        }

        // Alert first, persistence second, matching the urgency order;
        // a full alert channel is an error, not a reason to block analysis
        if let Err(e) = self.detection_tx.try_send(event) {
            error!("Failed to enqueue detection event: {}", e);
            if let Some(m) = &self.metrics {
                m.alert_errors
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
        }

        match self.recorder.persist(
            &clip.samples,
            clip.sample_rate,
            &processed,
            self.preprocessor.model_rate(),
        ) {
            Ok(index) => {
                debug!("Detection #{} persisted", index);
            }
            Err(e) => {
                warn!("Failed to persist detection: {}", e);
                if let Some(m) = &self.metrics {
                    m.persist_errors
                        .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                }
            }
        }
    }
}
