use crate::bpm::Bpm;
use crate::config::{Config, ConfigError};
use crate::output::{AlertCode, AlertSink, BpmDisplay, Readout};
use crate::pipeline::Pipeline;
use crate::ready::DataReady;
use crate::source::SampleSource;

/// Main-loop side of the heart rate monitor.
///
/// Owns all pipeline state. Nothing here is shared with interrupt context
/// except the [`DataReady`] flag passed to [`Monitor::poll`].
pub struct Monitor<const N: usize> {
    pipeline: Pipeline<N>,
    readout: Readout,
    last: Bpm,
}

impl<const N: usize> Monitor<N> {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Ok(Self {
            pipeline: Pipeline::new(config)?,
            readout: Readout::default(),
            last: Bpm::NONE,
        })
    }

    pub fn pipeline(&self) -> &Pipeline<N> {
        &self.pipeline
    }

    /// Most recent valid estimate.
    pub fn last_bpm(&self) -> Bpm {
        self.last
    }

    /// One loop iteration: if the sensor signalled new data, drain it through
    /// the pipeline and publish a completed estimate.
    ///
    /// Runs to completion; there is no suspension point while the pipeline is
    /// mid-triplet or mid-buffer.
    pub fn poll<S, D, A>(
        &mut self,
        ready: &DataReady,
        source: &mut S,
        display: &mut D,
        alerts: &mut A,
    ) -> Result<Option<Bpm>, S::Error>
    where
        S: SampleSource,
        D: BpmDisplay,
        A: AlertSink,
    {
        if !ready.take() {
            return Ok(None);
        }

        let Some(analysis) = self.pipeline.drain(source)? else {
            return Ok(None);
        };

        let bpm = analysis.bpm;
        if !bpm.is_estimate() {
            log::info!("no estimate ({} valleys)", analysis.valleys);
            return Ok(None);
        }
        self.last = bpm;

        if !self.pipeline.config().is_plausible(bpm.0) {
            log::warn!("implausible estimate: {} bpm", bpm.0);
            alerts.alert(AlertCode::BpmOutOfRange);
        }

        if let Some((whole, hundredths)) = self.readout.update(bpm) {
            display.show_bpm(whole, hundredths);
        }

        Ok(Some(bpm))
    }
}
