use std::time::Instant;

use super::ring_buffer::AudioConsumer;

/// A batch of raw device samples with reconstructed metadata.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<i16>,
    pub timestamp: Instant,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Reads audio from the ring buffer and reconstructs frame metadata
pub struct FrameReader {
    consumer: AudioConsumer,
    sample_rate: u32,
    channels: u16,
    samples_read: u64,
    start_time: Instant,
}

impl FrameReader {
    pub fn new(consumer: AudioConsumer, sample_rate: u32, channels: u16) -> Self {
        Self {
            consumer,
            sample_rate,
            channels,
            samples_read: 0,
            start_time: Instant::now(),
        }
    }

    /// Apply a new negotiated device format after a stream restart.
    pub fn update_device_config(&mut self, sample_rate: u32, channels: u16) {
        if self.sample_rate != sample_rate || self.channels != channels {
            tracing::info!(
                "Frame reader device config: {}Hz {}ch -> {}Hz {}ch",
                self.sample_rate,
                self.channels,
                sample_rate,
                channels
            );
            self.sample_rate = sample_rate;
            self.channels = channels;
        }
    }

    /// Read the next frame, reconstructing its timestamp from the sample
    /// count. Returns None when the ring buffer is empty.
    pub fn read_frame(&mut self, max_samples: usize) -> Option<AudioFrame> {
        let mut buffer = vec![0i16; max_samples];
        let samples_read = self.consumer.read(&mut buffer);

        if samples_read == 0 {
            return None;
        }

        buffer.truncate(samples_read);

        let elapsed_ms = (self.samples_read * 1000)
            / (self.sample_rate as u64 * self.channels.max(1) as u64);
        let timestamp = self.start_time + std::time::Duration::from_millis(elapsed_ms);

        self.samples_read += samples_read as u64;

        Some(AudioFrame {
            samples: buffer,
            timestamp,
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }

    /// Samples currently waiting in the ring buffer.
    pub fn available_samples(&self) -> usize {
        self.consumer.slots()
    }
}
