use std::error::Error;
use std::time::Duration;

use drivers_shared::max30102::{Max30102, PART_ID};
use drivers_simu::{
    buzz::Buzzer,
    display::Display,
    max30102::{Device, Sensor},
    ppg::PpgGenerator,
    SENSOR_SPS,
};
use hrm::{AlertCode, AlertSink, DataReady, Monitor, DEFAULT_CAPACITY};

static DATA_READY: DataReady = DataReady::new();

// Idle time between loop iterations, standing in for waiting on an interrupt.
const IDLE: Duration = Duration::from_millis(1);

fn usage() -> ! {
    eprintln!("usage: ppg-sim [bpm] [speedup] [part id (hex)]");
    std::process::exit(2);
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = std::env::args().collect::<Vec<_>>();
    if args.len() > 4 {
        usage();
    }
    let bpm: f32 = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(72.0);
    let speedup: f32 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(1.0);
    let part_id = args
        .get(3)
        .map(|s| u8::from_str_radix(s.trim_start_matches("0x"), 16))
        .transpose()?
        .unwrap_or(PART_ID);

    let config = drivers_simu::pipeline_config();
    log::info!(
        "simulating {} bpm at {}x, pipeline rate {} values/s",
        bpm,
        speedup,
        config.sample_rate
    );

    let sensor = Sensor::new(Device::new(PpgGenerator::new(SENSOR_SPS, bpm)).with_part_id(part_id));
    let mut hrm = Max30102::new(sensor.bus());
    let mut display = Display::default();
    let mut buzzer = Buzzer::new();

    if let Err(e) = hrm.setup_for_heart_rate_monitoring() {
        log::error!("sensor init failed: {:?}", e);
        buzzer.alert(AlertCode::InitFailure);
        drivers_simu::sys_halt();
    }

    let mut monitor =
        Monitor::<DEFAULT_CAPACITY>::new(config).map_err(|e| format!("invalid config: {}", e))?;
    let _clock = sensor.start_clock(SENSOR_SPS * speedup, &DATA_READY);

    loop {
        match monitor.poll(&DATA_READY, &mut hrm, &mut display, &mut buzzer) {
            Ok(Some(bpm)) => log::debug!("estimate {} bpm", bpm.0),
            Ok(None) => {}
            Err(e) => log::error!("sensor read failed: {:?}", e),
        }
        std::thread::sleep(IDLE);
    }
}
