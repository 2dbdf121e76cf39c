//! Detection persistence
//!
//! Writes two WAV files per detection into the recordings directory:
//! the raw clip at its capture rate and the preprocessed clip at the
//! model rate. Numbering starts at 1 and survives restarts by resuming
//! after the highest index already on disk.

use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RecorderError;

const RAW_PREFIX: &str = "Gunshot Sound Sample #";
const PROCESSED_PREFIX: &str = "Modified Gunshot Sound Sample #";
const WAV_SUFFIX: &str = ".wav";

pub struct DetectionRecorder {
    dir: PathBuf,
    next_index: u64,
}

impl DetectionRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, RecorderError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let next_index = highest_existing_index(&dir)? + 1;
        if next_index > 1 {
            tracing::info!(
                "Recordings directory has existing samples; resuming at #{}",
                next_index
            );
        }
        Ok(Self { dir, next_index })
    }

    /// Index the next detection will be persisted under.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Write the raw and processed buffers for one detection. Returns
    /// the index the pair was persisted under.
    pub fn persist(
        &mut self,
        raw: &[i16],
        raw_rate: u32,
        processed: &[i16],
        processed_rate: u32,
    ) -> Result<u64, RecorderError> {
        let index = self.next_index;

        let raw_path = self.dir.join(format!("{}{}{}", RAW_PREFIX, index, WAV_SUFFIX));
        write_mono_wav(&raw_path, raw, raw_rate)?;

        let processed_path = self
            .dir
            .join(format!("{}{}{}", PROCESSED_PREFIX, index, WAV_SUFFIX));
        write_mono_wav(&processed_path, processed, processed_rate)?;

        tracing::info!(
            "Persisted detection #{} ({:?}, {:?})",
            index,
            raw_path.file_name().unwrap_or_default(),
            processed_path.file_name().unwrap_or_default()
        );

        self.next_index += 1;
        Ok(index)
    }
}

fn write_mono_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<(), RecorderError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Highest raw-sample index already present in the directory, 0 when
/// none exist.
fn highest_existing_index(dir: &Path) -> Result<u64, RecorderError> {
    let mut highest = 0u64;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(index) = name
            .strip_prefix(RAW_PREFIX)
            .and_then(|rest| rest.strip_suffix(WAV_SUFFIX))
            .and_then(|digits| digits.parse::<u64>().ok())
        {
            highest = highest.max(index);
        }
    }
    Ok(highest)
}
