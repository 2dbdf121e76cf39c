pub struct LevelMeter {
    epsilon: f32,
}

impl LevelMeter {
    pub fn new() -> Self {
        Self { epsilon: 1e-10 }
    }

    /// Peak absolute sample value. i16::MIN has no positive counterpart,
    /// so the result saturates at i16::MAX.
    pub fn peak(&self, frame: &[i16]) -> i16 {
        frame
            .iter()
            .map(|&sample| (sample as i32).abs())
            .max()
            .unwrap_or(0)
            .min(i16::MAX as i32) as i16
    }

    pub fn calculate_rms(&self, frame: &[i16]) -> f32 {
        if frame.is_empty() {
            return 0.0;
        }

        let sum_squares: i64 = frame
            .iter()
            .map(|&sample| {
                let s = sample as i64;
                s * s
            })
            .sum();

        let mean_square = sum_squares as f64 / frame.len() as f64;
        (mean_square.sqrt() / 32768.0) as f32
    }

    pub fn rms_to_dbfs(&self, rms: f32) -> f32 {
        if rms <= self.epsilon {
            return -100.0;
        }
        20.0 * rms.log10()
    }

    pub fn calculate_dbfs(&self, frame: &[i16]) -> f32 {
        let rms = self.calculate_rms(frame);
        self.rms_to_dbfs(rms)
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new()
    }
}
