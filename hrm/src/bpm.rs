/// Beats per minute. `0.0` means no estimate could be made.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bpm(pub f32);

impl Bpm {
    pub const NONE: Bpm = Bpm(0.0);

    pub fn is_estimate(&self) -> bool {
        self.0 > 0.0
    }

    /// Integer part and two truncated decimal digits, e.g. `60.4838` ->
    /// `(60, 48)`.
    pub fn split(&self) -> (u16, u8) {
        if !self.is_estimate() {
            return (0, 0);
        }
        let whole = self.0 as u16;
        let hundredths = ((self.0 - whole as f32) * 100.0) as u8;
        (whole, hundredths.min(99))
    }
}

/// Mean valley-to-valley interval of `valleys` (indices into a signal sampled
/// at `sample_rate` values per second), converted to beats per minute.
pub fn bpm_from_valleys(valleys: &[usize], sample_rate: f32) -> Bpm {
    if valleys.len() < 2 || !(sample_rate > 0.0) {
        return Bpm::NONE;
    }

    let seconds_per_sample = 1.0 / sample_rate;
    let total: f32 = valleys
        .windows(2)
        .map(|w| w[1].saturating_sub(w[0]) as f32 * seconds_per_sample)
        .sum();
    let mean_interval = total / (valleys.len() - 1) as f32;

    if mean_interval > 0.0 {
        Bpm(60.0 / mean_interval)
    } else {
        Bpm::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evenly_spaced_valleys() {
        let bpm = bpm_from_valleys(&[10, 72, 134], 62.5);
        assert!((bpm.0 - 60.48).abs() < 0.01, "{:?}", bpm);
        assert_eq!(bpm.split(), (60, 48));
    }

    #[test]
    fn uneven_intervals_are_averaged() {
        // 50 and 75 samples at 50 Hz -> 1.25 s mean
        let bpm = bpm_from_valleys(&[0, 50, 125], 50.0);
        assert!((bpm.0 - 48.0).abs() < 0.001, "{:?}", bpm);
    }

    #[test]
    fn insufficient_valleys() {
        assert_eq!(bpm_from_valleys(&[], 62.5), Bpm::NONE);
        assert_eq!(bpm_from_valleys(&[42], 62.5), Bpm::NONE);
        assert!(!bpm_from_valleys(&[42], 62.5).is_estimate());
    }

    #[test]
    fn non_increasing_indices() {
        assert_eq!(bpm_from_valleys(&[5, 5, 5], 62.5), Bpm::NONE);
        assert_eq!(bpm_from_valleys(&[10, 72], 0.0), Bpm::NONE);
    }

    #[test]
    fn split_truncates() {
        assert_eq!(Bpm(72.999).split(), (72, 99));
        assert_eq!(Bpm(100.0).split(), (100, 0));
        assert_eq!(Bpm(59.5).split(), (59, 50));
        assert_eq!(Bpm::NONE.split(), (0, 0));
    }
}
