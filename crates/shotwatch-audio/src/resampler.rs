use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Whole-clip resampler for mono i16 audio using Rubato's sinc
/// interpolation.
///
/// Unlike a streaming resampler this processes one complete clip per
/// call: the input is chunked through the sinc filter, the filter delay
/// is flushed with zero padding, and the output is trimmed to exactly
/// `round(len * out_rate / in_rate)` samples. Shape is therefore a pure
/// function of the input length.
pub struct ClipResampler {
    in_rate: u32,
    out_rate: u32,
    resampler: SincFixedIn<f32>,
    chunk_size: usize,
}

impl ClipResampler {
    /// Create a new mono clip resampler from in_rate -> out_rate.
    pub fn new(in_rate: u32, out_rate: u32) -> Self {
        // 1024-sample chunks keep the filter state small while staying
        // well under a clip length
        let chunk_size = 1024;

        let sinc_params = SincInterpolationParameters {
            sinc_len: 64,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Cubic,
            oversampling_factor: 128,
            window: WindowFunction::Blackman2,
        };

        let resampler = SincFixedIn::<f32>::new(
            out_rate as f64 / in_rate as f64,
            2.0,
            sinc_params,
            chunk_size,
            1, // mono
        )
        .expect("Failed to create Rubato resampler");

        Self {
            in_rate,
            out_rate,
            resampler,
            chunk_size,
        }
    }

    /// Resample a complete clip. Returns exactly
    /// `round(input.len() * out_rate / in_rate)` samples; the same input
    /// length always yields the same output length.
    pub fn process_clip(&mut self, input: &[i16]) -> Vec<i16> {
        if self.in_rate == self.out_rate {
            return input.to_vec();
        }

        let ratio = self.out_rate as f64 / self.in_rate as f64;
        let expected = (input.len() as f64 * ratio).round() as usize;

        // Each clip is independent; clear any filter state from the last one
        self.resampler.reset();

        let float_in: Vec<f32> = input.iter().map(|&s| s as f32 / 32768.0).collect();

        let mut produced: Vec<f32> = Vec::with_capacity(expected + self.chunk_size);
        let mut pos = 0usize;
        // Input chunks plus enough zero chunks to flush the sinc delay
        let max_iterations = input.len() / self.chunk_size + 64;
        let mut iterations = 0usize;

        while produced.len() < expected && iterations < max_iterations {
            iterations += 1;

            let mut chunk = vec![0.0f32; self.chunk_size];
            if pos < float_in.len() {
                let n = (float_in.len() - pos).min(self.chunk_size);
                chunk[..n].copy_from_slice(&float_in[pos..pos + n]);
                pos += n;
            }

            let frames = match self.resampler.process(&[chunk], None) {
                Ok(frames) => frames,
                Err(e) => {
                    tracing::error!("Resampler error: {}", e);
                    return Vec::new();
                }
            };
            if !frames.is_empty() {
                produced.extend_from_slice(&frames[0]);
            }
        }

        produced.truncate(expected);

        produced
            .iter()
            .map(|&sample| {
                let clamped = sample.clamp(-1.0, 1.0);
                (clamped * 32767.0).round() as i16
            })
            .collect()
    }

    pub fn input_rate(&self) -> u32 {
        self.in_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.out_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_same_rate() {
        let mut rs = ClipResampler::new(22_050, 22_050);
        let input = vec![100i16, 200, 300, 400, 500];
        let output = rs.process_clip(&input);
        assert_eq!(input, output, "Passthrough should return identical data");
    }

    #[test]
    fn halving_rate_halves_length_exactly() {
        let mut rs = ClipResampler::new(44_100, 22_050);
        let input: Vec<i16> = (0..88_200).map(|i| ((i % 200) as i16) - 100).collect();
        let out = rs.process_clip(&input);
        assert_eq!(out.len(), 44_100);
    }

    #[test]
    fn output_length_is_deterministic() {
        let mut rs = ClipResampler::new(48_000, 22_050);
        let input = vec![500i16; 9_600];
        let first = rs.process_clip(&input).len();
        let second = rs.process_clip(&input).len();
        assert_eq!(first, second);
        assert_eq!(first, (9_600f64 * 22_050.0 / 48_000.0).round() as usize);
    }

    #[test]
    fn constant_tone_survives_resampling() {
        let mut rs = ClipResampler::new(44_100, 22_050);
        let input = vec![1000i16; 44_100];
        let out = rs.process_clip(&input);
        // Skip the edges, which carry interpolation artifacts
        for &s in &out[100..out.len() - 100] {
            assert!(
                (900..=1100).contains(&s),
                "Sample {} too far from expected 1000",
                s
            );
        }
    }
}
