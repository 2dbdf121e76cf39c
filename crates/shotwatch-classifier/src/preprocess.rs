use shotwatch_audio::resampler::ClipResampler;

/// Fixed transformation pipeline that turns one raw clip into one model
/// input: resample to the model rate, peak-normalize, fit to the model
/// input width. Deterministic, and idempotent in shape: a given input
/// length always produces `input_width` samples.
pub struct Preprocessor {
    model_rate: u32,
    input_width: usize,
    ceiling: i16,
    resampler: Option<ClipResampler>,
}

impl Preprocessor {
    pub fn new(model_rate: u32, input_width: usize, ceiling: i16) -> Self {
        Self {
            model_rate,
            input_width,
            ceiling,
            resampler: None,
        }
    }

    pub fn model_rate(&self) -> u32 {
        self.model_rate
    }

    pub fn process(&mut self, samples: &[i16], input_rate: u32) -> Vec<i16> {
        let resampled = if input_rate == self.model_rate {
            samples.to_vec()
        } else {
            self.resampler_for(input_rate).process_clip(samples)
        };

        let normalized = normalize_peak(&resampled, self.ceiling);
        fit_width(normalized, self.input_width)
    }

    fn resampler_for(&mut self, input_rate: u32) -> &mut ClipResampler {
        let stale = self
            .resampler
            .as_ref()
            .map(|r| r.input_rate() != input_rate)
            .unwrap_or(true);
        if stale {
            tracing::info!(
                "Configuring preprocessing resampler: {}Hz -> {}Hz",
                input_rate,
                self.model_rate
            );
            self.resampler = Some(ClipResampler::new(input_rate, self.model_rate));
        }
        self.resampler.as_mut().unwrap()
    }
}

/// Scale so the peak absolute amplitude lands on `ceiling`. An
/// all-silent buffer has no peak to scale against and is returned
/// unchanged.
pub fn normalize_peak(samples: &[i16], ceiling: i16) -> Vec<i16> {
    let peak = samples
        .iter()
        .map(|&s| (s as i32).abs())
        .max()
        .unwrap_or(0);
    if peak == 0 {
        return samples.to_vec();
    }

    let scale = ceiling as f32 / peak as f32;
    samples
        .iter()
        .map(|&s| (s as f32 * scale) as i16)
        .collect()
}

/// Truncate to `width` samples, or zero-pad a shorter buffer to exactly
/// that width.
pub fn fit_width(mut samples: Vec<i16>, width: usize) -> Vec<i16> {
    samples.resize(width, 0);
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_scales_peak_to_ceiling() {
        let out = normalize_peak(&[0, 4096, -8192], 16_384);
        assert_eq!(out, vec![0, 8192, -16_384]);
    }

    #[test]
    fn normalize_all_silent_is_noop() {
        let silence = vec![0i16; 1024];
        assert_eq!(normalize_peak(&silence, 16_384), silence);
    }

    #[test]
    fn normalize_handles_negative_peak() {
        let out = normalize_peak(&[-8192, 100], 16_384);
        assert_eq!(out[0], -16_384);
    }

    #[test]
    fn fit_width_truncates_and_pads() {
        assert_eq!(fit_width(vec![1, 2, 3, 4], 2), vec![1, 2]);
        assert_eq!(fit_width(vec![1, 2], 4), vec![1, 2, 0, 0]);
    }

    #[test]
    fn process_output_shape_is_fixed() {
        let mut pre = Preprocessor::new(22_050, 44_100, 16_384);
        // Same-rate path: no resampler involved
        let out = pre.process(&vec![1000i16; 50_000], 22_050);
        assert_eq!(out.len(), 44_100);
        let out = pre.process(&vec![1000i16; 10_000], 22_050);
        assert_eq!(out.len(), 44_100);
    }

    #[test]
    fn process_is_deterministic() {
        let clip: Vec<i16> = (0..88_200).map(|i| ((i * 31) % 6000) as i16 - 3000).collect();
        let mut pre = Preprocessor::new(22_050, 44_100, 16_384);
        let first = pre.process(&clip, 44_100);
        let second = pre.process(&clip, 44_100);
        assert_eq!(first.len(), second.len());
        assert_eq!(first, second);
    }

    #[test]
    fn two_second_clip_at_device_rate_fills_input_exactly() {
        // 2s at 44.1kHz resamples to 44100 samples at 22.05kHz, the
        // model input width, so no padding is involved on the hot path
        let clip = vec![2000i16; 88_200];
        let mut pre = Preprocessor::new(22_050, 44_100, 16_384);
        let out = pre.process(&clip, 44_100);
        assert_eq!(out.len(), 44_100);
    }
}
