//! Headless pipeline test: ring buffer -> clip assembler -> gate ->
//! classifier worker -> alert worker, with a scripted classifier in
//! place of the ONNX model and no audio hardware involved.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::mpsc;

use shotwatch_alert::{AlertConfig, AlertProcessor, LogAlertSink};
use shotwatch_audio::capture::DeviceConfig;
use shotwatch_audio::clip::{ClipAssembler, ClipConfig};
use shotwatch_audio::frame_reader::FrameReader;
use shotwatch_audio::ring_buffer::AudioRingBuffer;
use shotwatch_classifier::mock::MockClassifier;
use shotwatch_classifier::{ClassifierConfig, ClassifierProcessor, Scores};
use shotwatch_gate::GateConfig;
use shotwatch_telemetry::PipelineMetrics;

const RATE: u32 = 22_050;
const CLIP_SAMPLES: usize = 44_100; // 2s at 22.05kHz

async fn wait_for(metrics: &PipelineMetrics, f: impl Fn(&PipelineMetrics) -> bool) {
    for _ in 0..200 {
        if f(metrics) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("pipeline did not reach expected state within timeout");
}

#[tokio::test(flavor = "multi_thread")]
async fn loud_clip_flows_through_to_alert() {
    let dir = TempDir::new().unwrap();
    let metrics = Arc::new(PipelineMetrics::default());

    let rb = AudioRingBuffer::new(1 << 20);
    let (mut producer, consumer) = rb.split();

    let frame_reader = FrameReader::new(consumer, RATE, 1);
    let (clip_tx, clip_rx) = mpsc::channel(8);
    let assembler = ClipAssembler::new(
        frame_reader,
        clip_tx,
        ClipConfig {
            clip_duration_secs: 2,
            gate: GateConfig { threshold: 1000 },
        },
    )
    .with_metrics(metrics.clone());
    let assembler_handle = assembler.spawn(DeviceConfig {
        sample_rate: RATE,
        channels: 1,
    });

    let classifier = MockClassifier::always(Scores {
        ambient: 0.001,
        gunshot: 0.999,
    });
    let classifier_cfg = ClassifierConfig {
        recordings_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let (event_tx, event_rx) = mpsc::channel(16);
    let classifier_proc =
        ClassifierProcessor::new(clip_rx, event_tx, classifier, &classifier_cfg)
            .unwrap()
            .with_metrics(metrics.clone());
    let classifier_handle = tokio::spawn(classifier_proc.run());

    let alert_proc = AlertProcessor::new(event_rx, Box::new(LogAlertSink), AlertConfig::default())
        .with_metrics(metrics.clone());
    let alert_handle = tokio::spawn(alert_proc.run());

    // One quiet clip (rejected at the gate), one loud clip (detected)
    let quiet = vec![10i16; CLIP_SAMPLES];
    producer.write(&quiet).unwrap();
    let mut loud = vec![0i16; CLIP_SAMPLES];
    loud[100] = 5000;
    producer.write(&loud).unwrap();

    wait_for(&metrics, |m| {
        m.alerts_dispatched.load(Ordering::Relaxed) >= 1
    })
    .await;

    assert_eq!(metrics.clips_assembled.load(Ordering::Relaxed), 2);
    assert_eq!(metrics.clips_rejected.load(Ordering::Relaxed), 1);
    assert_eq!(metrics.clips_admitted.load(Ordering::Relaxed), 1);
    assert_eq!(metrics.inferences.load(Ordering::Relaxed), 1);
    assert_eq!(metrics.detections.load(Ordering::Relaxed), 1);
    assert_eq!(metrics.alerts_dispatched.load(Ordering::Relaxed), 1);

    // Detection persisted both WAVs under the restart-safe counter
    assert!(dir.path().join("Gunshot Sound Sample #1.wav").exists());
    assert!(dir
        .path()
        .join("Modified Gunshot Sound Sample #1.wav")
        .exists());

    assembler_handle.abort();
    classifier_handle.abort();
    alert_handle.abort();
}

#[tokio::test(flavor = "multi_thread")]
async fn quiet_audio_never_reaches_the_classifier() {
    let metrics = Arc::new(PipelineMetrics::default());

    let rb = AudioRingBuffer::new(1 << 20);
    let (mut producer, consumer) = rb.split();
    let frame_reader = FrameReader::new(consumer, RATE, 1);
    let (clip_tx, mut clip_rx) = mpsc::channel(8);
    let assembler = ClipAssembler::new(
        frame_reader,
        clip_tx,
        ClipConfig {
            clip_duration_secs: 2,
            gate: GateConfig { threshold: 1000 },
        },
    )
    .with_metrics(metrics.clone());
    let assembler_handle = assembler.spawn(DeviceConfig {
        sample_rate: RATE,
        channels: 1,
    });

    // Three clips of sub-threshold noise
    producer.write(&vec![999i16; CLIP_SAMPLES * 3]).unwrap();

    wait_for(&metrics, |m| {
        m.clips_assembled.load(Ordering::Relaxed) >= 3
    })
    .await;

    assert_eq!(metrics.clips_rejected.load(Ordering::Relaxed), 3);
    assert_eq!(metrics.clips_admitted.load(Ordering::Relaxed), 0);
    assert!(clip_rx.try_recv().is_err(), "no clip should be enqueued");

    assembler_handle.abort();
}
