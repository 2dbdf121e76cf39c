use rtrb::{Consumer, Producer, RingBuffer};
use tracing::warn;

/// Audio ring buffer using rtrb (real-time safe)
pub struct AudioRingBuffer {
    producer: Producer<i16>,
    consumer: Consumer<i16>,
}

impl AudioRingBuffer {
    /// Create a new ring buffer with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (producer, consumer) = RingBuffer::new(capacity);
        Self { producer, consumer }
    }

    /// Split into producer and consumer for separate threads
    pub fn split(self) -> (AudioProducer, AudioConsumer) {
        (
            AudioProducer {
                producer: self.producer,
            },
            AudioConsumer {
                consumer: self.consumer,
            },
        )
    }
}

/// Producer half of the ring buffer (for the audio callback thread)
pub struct AudioProducer {
    producer: Producer<i16>,
}

impl AudioProducer {
    /// Write samples from the audio callback (non-blocking). Either the
    /// whole slice is committed or nothing is; a full buffer reports an
    /// error so the callback can count the drop and move on.
    pub fn write(&mut self, samples: &[i16]) -> Result<usize, ()> {
        let mut chunk = match self.producer.write_chunk(samples.len()) {
            Ok(chunk) => chunk,
            Err(_) => {
                warn!(
                    "Ring buffer overflow: tried to write {} samples, buffer full",
                    samples.len()
                );
                return Err(());
            }
        };

        // Write may wrap; fill both slices
        let (first, second) = chunk.as_mut_slices();
        let split = first.len();
        if split > 0 {
            first.copy_from_slice(&samples[..split]);
        }
        if !second.is_empty() {
            second.copy_from_slice(&samples[split..]);
        }
        chunk.commit_all();
        Ok(samples.len())
    }

    /// Check available space
    pub fn slots(&self) -> usize {
        self.producer.slots()
    }
}

/// Consumer half of the ring buffer (for the processing side)
pub struct AudioConsumer {
    consumer: Consumer<i16>,
}

impl AudioConsumer {
    /// Read up to `buffer.len()` samples (non-blocking); returns the
    /// number actually read.
    pub fn read(&mut self, buffer: &mut [i16]) -> usize {
        let chunk = match self.consumer.read_chunk(buffer.len()) {
            Ok(chunk) => chunk,
            Err(rtrb::chunks::ChunkError::TooFewSlots(available)) => {
                if available == 0 {
                    return 0;
                }
                self.consumer.read_chunk(available).unwrap()
            }
        };

        let len = chunk.len();
        let (first, second) = chunk.as_slices();
        let split = first.len();
        if split > 0 {
            buffer[..split].copy_from_slice(first);
        }
        if !second.is_empty() {
            buffer[split..split + second.len()].copy_from_slice(second);
        }
        chunk.commit_all();
        len
    }

    /// Check available samples to read
    pub fn slots(&self) -> usize {
        self.consumer.slots()
    }
}
