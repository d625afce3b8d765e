pub mod buzz;
pub mod display;
pub mod max30102;
pub mod ppg;

/// Raw sensor sample rate of the heart rate preset.
pub const SENSOR_SPS: f32 = 1000.0;

/// Pipeline configuration matching the simulated sensor: one filtered value
/// per oversampling group and triplet.
pub fn pipeline_config() -> hrm::Config {
    let config = hrm::Config::default();
    hrm::Config {
        sample_rate: SENSOR_SPS / (config.oversampling * hrm::TRIPLET) as f32,
        ..config
    }
}

pub fn sys_halt() -> ! {
    println!("Simulated halt. Exiting Simulator.");
    std::process::exit(1);
}
