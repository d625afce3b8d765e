use thiserror_no_std::Error;

use crate::trend::TrendPolicy;

/// Upper bound for the number of largest variations averaged into the
/// adaptive threshold.
pub const MAX_TOP_K: usize = 10;

/// Smoothed values consumed per filtered value.
pub const TRIPLET: usize = 3;

/// Signal buffer capacity used by [`crate::DefaultPipeline`].
pub const DEFAULT_CAPACITY: usize = 150;

/// Smallest signal buffer that can hold a descent and a recovery.
pub const MIN_CAPACITY: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Raw samples averaged into one smoothed value (software oversampling).
    pub oversampling: usize,
    /// Number of largest sample-to-sample variations averaged into the
    /// valley threshold.
    pub top_k: usize,
    /// Filtered values per second. Measured on the target, not derived.
    pub sample_rate: f32,
    /// Filtered values at or below this are treated as "no finger" and dropped.
    pub finger_floor: u32,
    pub trend_policy: TrendPolicy,
    pub min_bpm: f32,
    pub max_bpm: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oversampling: 16,
            top_k: MAX_TOP_K,
            sample_rate: 62.5,
            finger_floor: 5000,
            trend_policy: TrendPolicy::PassThrough,
            min_bpm: 30.0,
            max_bpm: 230.0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("oversampling factor must be at least 1")]
    ZeroOversampling,
    #[error("top-k must be between 1 and {max} (got {got})")]
    TopK { got: usize, max: usize },
    #[error("sample rate must be a positive, finite number")]
    SampleRate,
    #[error("plausible BPM band is empty")]
    BpmBand,
    #[error("signal buffer capacity must be at least {min} (got {got})")]
    Capacity { got: usize, min: usize },
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oversampling == 0 {
            return Err(ConfigError::ZeroOversampling);
        }
        if self.top_k == 0 || self.top_k > MAX_TOP_K {
            return Err(ConfigError::TopK {
                got: self.top_k,
                max: MAX_TOP_K,
            });
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::SampleRate);
        }
        if !(self.min_bpm < self.max_bpm) {
            return Err(ConfigError::BpmBand);
        }
        Ok(())
    }

    /// Whether `bpm` lies inside the plausible band `[min_bpm, max_bpm)`.
    pub fn is_plausible(&self, bpm: f32) -> bool {
        self.min_bpm <= bpm && bpm < self.max_bpm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let base = Config::default();

        let c = Config {
            oversampling: 0,
            ..base
        };
        assert_eq!(c.validate(), Err(ConfigError::ZeroOversampling));

        let c = Config { top_k: 0, ..base };
        assert_eq!(c.validate(), Err(ConfigError::TopK { got: 0, max: 10 }));

        let c = Config { top_k: 11, ..base };
        assert_eq!(c.validate(), Err(ConfigError::TopK { got: 11, max: 10 }));

        let c = Config {
            sample_rate: 0.0,
            ..base
        };
        assert_eq!(c.validate(), Err(ConfigError::SampleRate));

        let c = Config {
            sample_rate: f32::NAN,
            ..base
        };
        assert_eq!(c.validate(), Err(ConfigError::SampleRate));

        let c = Config {
            min_bpm: 120.0,
            max_bpm: 120.0,
            ..base
        };
        assert_eq!(c.validate(), Err(ConfigError::BpmBand));
    }

    #[test]
    fn plausible_band() {
        let c = Config::default();
        assert!(!c.is_plausible(29.9));
        assert!(c.is_plausible(30.0));
        assert!(c.is_plausible(60.48));
        assert!(!c.is_plausible(230.0));
    }
}
