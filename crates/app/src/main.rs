use anyhow::anyhow;
use clap::Parser;
use shotwatch_alert::{AlertConfig, AlertProcessor, LogAlertSink};
use shotwatch_audio::capture::{AudioCaptureThread, CaptureConfig};
use shotwatch_audio::clip::{ClipAssembler, ClipConfig};
use shotwatch_audio::device::DeviceManager;
use shotwatch_audio::frame_reader::FrameReader;
use shotwatch_audio::ring_buffer::AudioRingBuffer;
use shotwatch_classifier::{ClassifierConfig, ClassifierProcessor, OnnxClassifier};
use shotwatch_foundation::*;
use shotwatch_gate::GateConfig;
use shotwatch_telemetry::PipelineMetrics;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

#[derive(Parser, Debug)]
#[command(name = "shotwatch", about = "Real-time acoustic gunshot detection")]
struct Cli {
    /// Input device name (host default when omitted)
    #[arg(short = 'D', long, env = "SHOTWATCH_DEVICE")]
    device: Option<String>,

    /// List available input devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Path to the ONNX gunshot model
    #[arg(
        short,
        long,
        env = "SHOTWATCH_MODEL",
        default_value = "models/gunshot_sound_model.onnx"
    )]
    model: PathBuf,

    /// Clip duration in seconds
    #[arg(long, default_value_t = 2)]
    clip_secs: u32,

    /// Peak-amplitude gate threshold (raw i16 counts)
    #[arg(long, default_value_t = 1000)]
    gate_threshold: i16,

    /// Minimum gunshot probability for a detection (inclusive)
    #[arg(long, default_value_t = 0.99)]
    confidence: f32,

    /// Directory detection WAV pairs are written to
    #[arg(long, default_value = "recordings")]
    recordings_dir: PathBuf,

    /// Alert recipient; repeat for multiple
    #[arg(long = "recipient")]
    recipients: Vec<String>,
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "shotwatch.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    std::mem::forget(_guard);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.list_devices {
        let manager = DeviceManager::new()?;
        for info in manager.enumerate_devices() {
            if info.is_default {
                println!("{} (default)", info.name);
            } else {
                println!("{}", info.name);
            }
        }
        return Ok(());
    }

    init_logging()?;
    tracing::info!("Starting shotwatch");

    let state_manager = StateManager::new();
    let _health_monitor = HealthMonitor::new(Duration::from_secs(10)).start();
    let shutdown = ShutdownHandler::new().install().await;

    state_manager.transition(AppState::Running)?;
    tracing::info!("Application state: {:?}", state_manager.current());

    let metrics = Arc::new(PipelineMetrics::default());

    // --- 1. Audio Capture ---
    let ring_buffer = AudioRingBuffer::new(16384 * 8);
    let (audio_producer, audio_consumer) = ring_buffer.split();
    let (audio_capture, device_cfg, device_cfg_rx) =
        AudioCaptureThread::spawn(CaptureConfig::default(), audio_producer, cli.device.clone())?;
    tracing::info!(
        "Audio capture thread started ({}Hz, {}ch)",
        device_cfg.sample_rate,
        device_cfg.channels
    );

    // --- 2. Clip Assembly + Gate ---
    let frame_reader = FrameReader::new(
        audio_consumer,
        device_cfg.sample_rate,
        device_cfg.channels,
    );
    let clip_cfg = ClipConfig {
        clip_duration_secs: cli.clip_secs,
        gate: GateConfig {
            threshold: cli.gate_threshold,
        },
    };
    // Bounded: analysis sheds the newest clip when it falls behind
    let (clip_tx, clip_rx) = mpsc::channel(8);
    let assembler = ClipAssembler::new(frame_reader, clip_tx, clip_cfg)
        .with_metrics(metrics.clone())
        .with_device_config(device_cfg_rx);
    let assembler_handle = assembler.spawn(device_cfg.clone());
    tracing::info!("Clip assembler task started.");

    // --- 3. Classifier Worker ---
    let classifier_cfg = ClassifierConfig {
        model_path: cli.model.clone(),
        confidence_threshold: cli.confidence,
        recordings_dir: cli.recordings_dir.clone(),
        ..Default::default()
    };
    let classifier = OnnxClassifier::new(
        &classifier_cfg.model_path,
        classifier_cfg.model_rate_hz,
        classifier_cfg.input_width,
    )
    .map_err(|e| anyhow!("Failed to load classifier: {}", e))?;
    let (event_tx, event_rx) = mpsc::channel(16);
    let classifier_proc =
        ClassifierProcessor::new(clip_rx, event_tx, classifier, &classifier_cfg)?
            .with_metrics(metrics.clone());
    let classifier_handle = tokio::spawn(classifier_proc.run());
    tracing::info!("Classifier worker task started.");

    // --- 4. Alert Worker ---
    let alert_cfg = AlertConfig {
        recipients: cli.recipients.clone(),
        ..Default::default()
    };
    let alert_proc = AlertProcessor::new(event_rx, Box::new(LogAlertSink), alert_cfg)
        .with_metrics(metrics.clone());
    let alert_handle = tokio::spawn(alert_proc.run());
    tracing::info!("Alert worker task started.");

    // --- Main Application Loop ---
    let mut stats_interval = tokio::time::interval(Duration::from_secs(30));
    loop {
        tokio::select! {
            _ = shutdown.wait() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = stats_interval.tick() => {
                tracing::info!(
                    "Pipeline: clips={} admitted={} rejected={} shed={} inferences={} detections={} alerts={}",
                    metrics.clips_assembled.load(Ordering::Relaxed),
                    metrics.clips_admitted.load(Ordering::Relaxed),
                    metrics.clips_rejected.load(Ordering::Relaxed),
                    metrics.clips_shed.load(Ordering::Relaxed),
                    metrics.inferences.load(Ordering::Relaxed),
                    metrics.detections.load(Ordering::Relaxed),
                    metrics.alerts_dispatched.load(Ordering::Relaxed),
                );
            }
        }
    }

    // --- Graceful Shutdown ---
    tracing::info!("Beginning graceful shutdown");
    state_manager.transition(AppState::Stopping)?;

    // 1. Stop the source of the audio stream.
    audio_capture.stop();
    tracing::info!("Audio capture thread stopped.");

    // 2. Abort the tasks. Dropping the assembler's sender lets the
    //    downstream recv() loops terminate on their own as well.
    assembler_handle.abort();
    classifier_handle.abort();
    alert_handle.abort();

    // 3. Await all handles so cleanup finishes before exit.
    let _ = assembler_handle.await;
    let _ = classifier_handle.await;
    let _ = alert_handle.await;

    state_manager.transition(AppState::Stopped)?;
    tracing::info!("Shutdown complete");

    Ok(())
}
