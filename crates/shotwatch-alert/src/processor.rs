//! Alert worker
//!
//! Drains the bounded detection channel and hands each event to the
//! configured sink. Dispatch failures are logged and counted; there is
//! no retry and no delivery confirmation.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use shotwatch_classifier::DetectionEvent;
use shotwatch_telemetry::{PipelineMetrics, PipelineStage};

use crate::sink::AlertSink;
use crate::types::AlertConfig;

pub struct AlertProcessor {
    event_rx: mpsc::Receiver<DetectionEvent>,
    sink: Box<dyn AlertSink>,
    config: AlertConfig,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl AlertProcessor {
    pub fn new(
        event_rx: mpsc::Receiver<DetectionEvent>,
        sink: Box<dyn AlertSink>,
        config: AlertConfig,
    ) -> Self {
        Self {
            event_rx,
            sink,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn run(mut self) {
        info!(
            "Alert worker started (sink: {}, {} recipients)",
            self.sink.name(),
            self.config.recipients.len()
        );

        while let Some(event) = self.event_rx.recv().await {
            if let Some(m) = &self.metrics {
                m.mark_stage_active(PipelineStage::Alert);
            }
            match self.sink.dispatch(&event, &self.config) {
                Ok(()) => {
                    if let Some(m) = &self.metrics {
                        m.alerts_dispatched
                            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                    }
                }
                Err(e) => {
                    error!("Alert dispatch failed: {}", e);
                    if let Some(m) = &self.metrics {
                        m.alert_errors
                            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                    }
                }
            }
        }

        info!("Alert worker shutting down: detection channel closed");
    }
}
