//! Alert transport abstraction

use crate::error::AlertResult;
use crate::types::AlertConfig;
use shotwatch_classifier::DetectionEvent;

/// Notification transport seam.
///
/// Implementations deliver one notification per detection event. No
/// retry or delivery confirmation happens above this trait; a returned
/// error is logged and counted by the alert worker.
pub trait AlertSink: Send {
    fn name(&self) -> &str;

    fn dispatch(&mut self, event: &DetectionEvent, config: &AlertConfig) -> AlertResult<()>;
}

/// Log-only transport. Writes one line per recipient; the outbound SMS
/// path of the deployed system stays disabled behind this sink.
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn name(&self) -> &str {
        "log"
    }

    fn dispatch(&mut self, event: &DetectionEvent, config: &AlertConfig) -> AlertResult<()> {
        if config.recipients.is_empty() {
            tracing::info!(
                "{} (sample #{}, confidence {:.4})",
                config.message,
                event.sample_index,
                event.confidence
            );
            return Ok(());
        }

        for recipient in &config.recipients {
            tracing::info!(
                "{} (sample #{}, confidence {:.4}) -> {}",
                config.message,
                event.sample_index,
                event.confidence,
                recipient
            );
        }
        Ok(())
    }
}
