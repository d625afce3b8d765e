use arrayvec::ArrayVec;

use crate::averaging::average;
use crate::bpm::{bpm_from_valleys, Bpm};
use crate::config::{Config, ConfigError, DEFAULT_CAPACITY, MIN_CAPACITY};
use crate::source::SampleSource;
use crate::threshold::mean_largest_variations;
use crate::trend::TripletFilter;
use crate::valley::find_valleys;

/// Result of one pass over a full signal buffer.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Analysis {
    pub threshold: u32,
    pub valleys: usize,
    pub bpm: Bpm,
}

/// Threshold estimation, valley detection and BPM calculation over `data`.
///
/// Depends on nothing but its arguments; `valleys` is cleared and refilled.
pub fn analyze<const CAP: usize>(
    data: &[u32],
    config: &Config,
    valleys: &mut ArrayVec<usize, CAP>,
) -> Analysis {
    valleys.clear();

    let threshold = mean_largest_variations(data, config.top_k);
    if threshold == 0 {
        log::debug!("no variation in {} values, skipping detection", data.len());
        return Analysis {
            threshold,
            valleys: 0,
            bpm: Bpm::NONE,
        };
    }

    find_valleys(data, threshold, valleys);
    let bpm = bpm_from_valleys(valleys, config.sample_rate);

    Analysis {
        threshold,
        valleys: valleys.len(),
        bpm,
    }
}

/// The signal-conditioning chain from raw samples to BPM estimates.
///
/// Raw samples are averaged in groups of `oversampling`, the averages are
/// reduced by the triplet trend filter, and filtered values above the finger
/// floor are collected into a signal buffer of capacity `N`. Every time that
/// buffer fills up it is analyzed once and emptied.
pub struct Pipeline<const N: usize> {
    config: Config,
    triplets: TripletFilter,
    signal: ArrayVec<u32, N>,
    valleys: ArrayVec<usize, N>,
}

pub type DefaultPipeline = Pipeline<DEFAULT_CAPACITY>;

impl<const N: usize> Pipeline<N> {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        if N < MIN_CAPACITY {
            return Err(ConfigError::Capacity {
                got: N,
                min: MIN_CAPACITY,
            });
        }

        Ok(Self {
            config,
            triplets: TripletFilter::new(config.trend_policy),
            signal: ArrayVec::new(),
            valleys: ArrayVec::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Filtered values collected since the last pass.
    pub fn signal(&self) -> &[u32] {
        &self.signal
    }

    /// Valley indices found by the last pass.
    pub fn valleys(&self) -> &[usize] {
        &self.valleys
    }

    pub fn add_smoothed(&mut self, v: u32) -> Option<Analysis> {
        let filtered = self.triplets.add(v)?;
        self.add_filtered(filtered)
    }

    pub fn add_filtered(&mut self, v: u32) -> Option<Analysis> {
        if v <= self.config.finger_floor {
            log::trace!("dropping {} (at or below finger floor)", v);
            return None;
        }

        // The buffer is emptied as soon as it fills, so there is always room.
        self.signal.push(v);
        if !self.signal.is_full() {
            return None;
        }

        let analysis = analyze(&self.signal, &self.config, &mut self.valleys);
        log::debug!(
            "pass: threshold {}, {} valleys, {} bpm",
            analysis.threshold,
            analysis.valleys,
            analysis.bpm.0
        );
        self.signal.clear();
        Some(analysis)
    }

    /// Runs every sample `source` currently reports as available through the
    /// chain. Samples that do not make up a full oversampling group stay
    /// queued in the source for the next call.
    ///
    /// Returns the last analysis completed while draining, if any.
    pub fn drain<S: SampleSource>(&mut self, source: &mut S) -> Result<Option<Analysis>, S::Error> {
        let oversampling = self.config.oversampling;
        let mut available = source.available()?;
        let mut result = None;

        while available >= oversampling {
            let smoothed = average(source, oversampling)?;
            available -= oversampling;
            if let Some(analysis) = self.add_smoothed(smoothed) {
                result = Some(analysis);
            }
        }
        Ok(result)
    }

    /// Drops all partially collected data.
    pub fn reset(&mut self) {
        self.triplets.reset();
        self.signal.clear();
        self.valleys.clear();
    }
}
