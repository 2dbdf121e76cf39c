pub mod capture;
pub mod clip;
pub mod constants;
pub mod device;
pub mod frame_reader;
pub mod resampler;
pub mod ring_buffer;
pub mod watchdog;

// Public API
pub use capture::{AudioCaptureThread, CaptureConfig, DeviceConfig};
pub use clip::{AudioClip, ClipAssembler, ClipConfig};
pub use device::{DeviceInfo, DeviceManager};
pub use frame_reader::FrameReader;
pub use resampler::ClipResampler;
pub use ring_buffer::AudioRingBuffer;
pub use watchdog::WatchdogTimer;
