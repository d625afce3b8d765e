#![cfg_attr(not(test), no_std)]

//! Heart rate estimation from a PPG sensor stream.
//!
//! Raw sample pairs are pulled from a [`SampleSource`], averaged
//! ([`averaging`]), reduced by the triplet [`trend`] filter and collected into
//! a fixed-size signal buffer. Each full buffer yields an adaptive variation
//! [`threshold`], the [`valley`] indices that clear it, and a [`bpm`] estimate
//! from the valley spacing.

pub mod averaging;
pub mod bpm;
pub mod config;
pub mod monitor;
pub mod output;
pub mod pipeline;
pub mod ready;
pub mod source;
pub mod threshold;
pub mod trend;
pub mod valley;

pub use bpm::{bpm_from_valleys, Bpm};
pub use config::{Config, ConfigError, DEFAULT_CAPACITY, MAX_TOP_K, TRIPLET};
pub use monitor::Monitor;
pub use output::{AlertCode, AlertSink, BpmDisplay, Readout};
pub use pipeline::{analyze, Analysis, DefaultPipeline, Pipeline};
pub use ready::DataReady;
pub use source::{RawSample, SampleSource, SAMPLE_MASK};
pub use trend::TrendPolicy;
