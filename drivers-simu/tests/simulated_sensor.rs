use drivers_shared::max30102::{Error, Max30102};
use drivers_simu::{
    max30102::{Device, Sensor},
    pipeline_config,
    ppg::PpgGenerator,
    SENSOR_SPS,
};
use hrm::{AlertCode, AlertSink, Bpm, BpmDisplay, DataReady, Monitor, DEFAULT_CAPACITY};

#[derive(Default)]
struct Screen(Vec<(u16, u8)>);

impl BpmDisplay for Screen {
    fn show_bpm(&mut self, whole: u16, hundredths: u8) {
        self.0.push((whole, hundredths));
    }
}

#[derive(Default)]
struct Alerts(Vec<AlertCode>);

impl AlertSink for Alerts {
    fn alert(&mut self, code: AlertCode) {
        self.0.push(code);
    }
}

/// Runs the monitor loop against the simulated sensor for `secs` seconds of
/// sensor time, polling after every sample.
fn run(signal: PpgGenerator, secs: usize) -> (Vec<Bpm>, Screen, Alerts) {
    let sensor = Sensor::new(Device::new(signal));
    let mut hrm = Max30102::new(sensor.bus());
    hrm.setup_for_heart_rate_monitoring().unwrap();

    let ready = DataReady::new();
    let mut monitor = Monitor::<DEFAULT_CAPACITY>::new(pipeline_config()).unwrap();
    let mut screen = Screen::default();
    let mut alerts = Alerts::default();
    let mut estimates = Vec::new();

    for _ in 0..secs * SENSOR_SPS as usize {
        sensor.step(1, &ready);
        if let Some(bpm) = monitor
            .poll(&ready, &mut hrm, &mut screen, &mut alerts)
            .unwrap()
        {
            estimates.push(bpm);
        }
    }
    (estimates, screen, alerts)
}

#[track_caller]
fn check_estimates(bpm: f32) {
    // 150 filtered values take 7.2 s of sensor time
    let (estimates, screen, alerts) = run(PpgGenerator::new(SENSOR_SPS, bpm), 30);

    assert!(estimates.len() >= 3, "{:?}", estimates);
    for e in &estimates {
        assert!((e.0 - bpm).abs() < 2.0, "{} vs {}", e.0, bpm);
    }
    assert!(!screen.0.is_empty());
    assert!(alerts.0.is_empty());
}

#[test]
fn estimates_match_simulated_rate() {
    check_estimates(60.0);
    check_estimates(75.0);
    check_estimates(110.0);
}

#[test]
fn no_finger_gives_no_estimate() {
    let (estimates, screen, alerts) = run(PpgGenerator::new(SENSOR_SPS, 70.0).no_finger(), 20);
    assert!(estimates.is_empty());
    assert!(screen.0.is_empty());
    assert!(alerts.0.is_empty());
}

#[test]
fn missing_sensor_is_detected() {
    let sensor = Sensor::new(Device::new(PpgGenerator::new(SENSOR_SPS, 70.0)).with_part_id(0x00));
    let mut hrm = Max30102::new(sensor.bus());
    assert_eq!(
        hrm.setup_for_heart_rate_monitoring(),
        Err(Error::DeviceAbsent { part_id: 0x00 })
    );
}
