use plotpy::{Curve, Plot};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::error::Error;

use hrm::{Analysis, Config, DefaultPipeline, RawSample, SampleSource};

// Samples handed to the pipeline per simulated almost-full interrupt.
const BATCH: usize = 30;

#[derive(serde::Deserialize)]
struct Row {
    red: u32,
    ir: u32,
}

/// Captured samples replayed as if they were sitting in the sensor FIFO.
#[derive(Default)]
struct Capture {
    queued: VecDeque<RawSample>,
}

impl SampleSource for Capture {
    type Error = Infallible;

    fn available(&mut self) -> Result<usize, Infallible> {
        Ok(self.queued.len())
    }

    fn pull(&mut self) -> Result<RawSample, Infallible> {
        // Only called for samples reported as available.
        Ok(self.queued.pop_front().unwrap_or_default())
    }
}

struct Pass {
    /// Raw sample index at which the pass completed.
    at: usize,
    analysis: Analysis,
}

fn replay(samples: &[RawSample], config: Config) -> Result<Vec<Pass>, Box<dyn Error>> {
    let mut pipeline = DefaultPipeline::new(config).map_err(|e| format!("{}", e))?;
    let mut capture = Capture::default();
    let mut passes = Vec::new();

    for (i, chunk) in samples.chunks(BATCH).enumerate() {
        capture.queued.extend(chunk);
        let result = pipeline.drain(&mut capture).unwrap_or_else(|e| match e {});
        if let Some(analysis) = result {
            passes.push(Pass {
                at: i * BATCH + chunk.len(),
                analysis,
            });
        }
    }
    Ok(passes)
}

fn plot_values_multiple(vals: &[(&str, &[(f32, f32)])]) -> Result<(), Box<dyn Error>> {
    let mut plot = Plot::new();
    for (label, vals) in vals {
        let mut curve = Curve::new();
        curve.set_line_width(2.0);

        curve.points_begin();
        for (x, y) in *vals {
            curve.points_add(x, y);
        }
        curve.points_end();
        curve.set_label(label);

        plot.add(&curve);
    }

    if let Err(e) = plot
        .legend()
        .grid_and_labels("s", "")
        .save_and_show("out.svg")
    {
        println!("{}", e);
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1).collect::<Vec<_>>();
    let plot = args.iter().any(|a| a == "--plot");
    args.retain(|a| a != "--plot");

    let Some(path) = args.first() else {
        eprintln!("usage: analyze_hrm <capture.csv> [raw sample rate] [--plot]");
        std::process::exit(2);
    };
    let raw_rate: f32 = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(1000.0);

    let file = std::fs::File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut samples = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row: Row = record.deserialize(None)?;
        samples.push(RawSample::new(row.red, row.ir));
    }
    log::info!("{} samples from {}", samples.len(), path);

    let config = Config::default();
    let config = Config {
        sample_rate: raw_rate / (config.oversampling * hrm::TRIPLET) as f32,
        ..config
    };
    config.validate().map_err(|e| format!("{}", e))?;

    let passes = replay(&samples, config)?;
    let mut bpm_vals = Vec::new();
    for (n, pass) in passes.iter().enumerate() {
        let secs = pass.at as f32 / raw_rate;
        let a = &pass.analysis;
        let (whole, hundredths) = a.bpm.split();
        let flag = if a.bpm.is_estimate() && !config.is_plausible(a.bpm.0) {
            " (implausible)"
        } else {
            ""
        };
        println!(
            "pass {:3} @ {:7.2}s: threshold {:5}, {:2} valleys, {}.{:02} bpm{}",
            n, secs, a.threshold, a.valleys, whole, hundredths, flag
        );
        if a.bpm.is_estimate() {
            bpm_vals.push((secs, a.bpm.0));
        }
    }

    if plot {
        let raw_vals = samples
            .iter()
            .enumerate()
            .map(|(i, s)| (i as f32 / raw_rate, s.secondary as f32))
            .collect::<Vec<_>>();
        let mean = raw_vals.iter().map(|v| v.1).sum::<f32>() / raw_vals.len().max(1) as f32;
        let raw_vals = raw_vals
            .into_iter()
            .map(|(t, v)| (t, (v - mean) / 100.0))
            .collect::<Vec<_>>();
        plot_values_multiple(&[
            ("ir (ac / 100)", raw_vals.as_slice()),
            ("bpm", bpm_vals.as_slice()),
        ])?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_finds_every_full_buffer() {
        // 72 bpm at 1000 sps, one filtered value per 48 raw samples
        let samples = (0..30_000)
            .map(|i| {
                let beat = i as f32 / 1000.0 * 72.0 / 60.0;
                let ir = 100_000.0 + 2_000.0 * (beat * core::f32::consts::TAU).sin();
                RawSample::new(0, ir as u32)
            })
            .collect::<Vec<_>>();
        let config = Config {
            sample_rate: 1000.0 / 48.0,
            ..Config::default()
        };

        let passes = replay(&samples, config).unwrap();
        assert_eq!(passes.len(), 30_000 / (150 * 48));
        for p in passes {
            assert!((p.analysis.bpm.0 - 72.0).abs() < 2.0, "{:?}", p.analysis);
        }
    }
}
