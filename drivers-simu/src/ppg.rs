use hrm::RawSample;

/// Synthetic reflective PPG signal: a pulse at a fixed rate riding on a large
/// DC level, with a slow baseline drift.
///
/// Timing is derived from the sample index only, so the waveform does not
/// depend on how fast the simulation is clocked.
pub struct PpgGenerator {
    sample_rate: f64,
    bpm: f64,
    dc: f64,
    amplitude: f64,
    n: u64,
}

impl PpgGenerator {
    pub fn new(sample_rate: f32, bpm: f32) -> Self {
        Self {
            sample_rate: sample_rate as f64,
            bpm: bpm as f64,
            dc: 120_000.0,
            amplitude: 3_000.0,
            n: 0,
        }
    }

    /// Sensor without a finger on it: ambient light only.
    pub fn no_finger(self) -> Self {
        self.with_levels(1_500.0, 40.0)
    }

    pub fn with_levels(mut self, dc: f32, amplitude: f32) -> Self {
        self.dc = dc as f64;
        self.amplitude = amplitude as f64;
        self
    }

    pub fn bpm(&self) -> f32 {
        self.bpm as f32
    }

    pub fn next_sample(&mut self) -> RawSample {
        let secs = self.n as f64 / self.sample_rate;
        self.n += 1;

        let beat = secs * self.bpm / 60.0;
        let norm_val = (beat * std::f64::consts::TAU).sin()
            + (beat * 0.1 * std::f64::consts::TAU).sin() * 0.05;
        let ir = (self.dc + norm_val * self.amplitude).max(0.0);
        // Red sees less of the pulse
        let red = (self.dc * 0.8 + norm_val * self.amplitude * 0.6).max(0.0);

        RawSample::new(red as u32, ir as u32)
    }
}

impl Iterator for PpgGenerator {
    type Item = RawSample;

    fn next(&mut self) -> Option<RawSample> {
        Some(self.next_sample())
    }
}
