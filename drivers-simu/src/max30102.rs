use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use drivers_shared::max30102::{
    reg, FifoConfig, SampleAveraging, ADDR, INT_A_FULL, INT_DIE_TEMP_RDY, INT_PPG_RDY,
    INT_PWR_RDY, MODE_RESET, MODE_SHDN, PART_ID,
};
use embedded_hal::blocking::i2c::{Write, WriteRead};
use hrm::{DataReady, RawSample};
use util::Fifo;

use crate::ppg::PpgGenerator;

const REV_ID: u8 = 0x03;
// 31.5 °C
const DIE_TEMP: (u8, u8) = (31, 0x08);

type Frame = [u8; 6];

fn encode(s: RawSample) -> Frame {
    let r = s.primary.to_be_bytes();
    let i = s.secondary.to_be_bytes();
    [r[1], r[2], r[3], i[1], i[2], i[3]]
}

/// Register-level model of a MAX30102.
///
/// Only what the driver uses is modelled: identification, reset, mode and
/// shutdown, the 32 slot FIFO with its pointers, the almost-full and
/// sample-ready interrupts, and die temperature. Writes to any FIFO pointer
/// register clear the FIFO.
pub struct Device {
    regs: [u8; 256],
    fifo: Fifo<32, Frame>,
    part_id: u8,
    signal: PpgGenerator,
}

impl Device {
    pub fn new(signal: PpgGenerator) -> Self {
        let mut dev = Self {
            regs: [0; 256],
            fifo: Fifo::default(),
            part_id: PART_ID,
            signal,
        };
        dev.power_on();
        dev
    }

    /// Something else answering at the sensor's address.
    pub fn with_part_id(mut self, part_id: u8) -> Self {
        self.part_id = part_id;
        self.power_on();
        self
    }

    fn power_on(&mut self) {
        self.regs = [0; 256];
        self.regs[reg::PART_ID as usize] = self.part_id;
        self.regs[reg::REV_ID as usize] = REV_ID;
        self.regs[reg::INT_STATUS_1 as usize] = INT_PWR_RDY;
        self.fifo.clear();
    }

    fn is_sampling(&self) -> bool {
        let mode = self.regs[reg::MODE_CONFIG as usize];
        mode & MODE_SHDN == 0 && matches!(mode & 0x07, 0x02 | 0x03 | 0x07)
    }

    fn almost_full_level(&self) -> usize {
        let cfg = FifoConfig {
            averaging: SampleAveraging::Avg1,
            rollover: true,
            almost_full: self.regs[reg::FIFO_CONFIG as usize] & 0x0F,
        };
        cfg.almost_full_level() as usize
    }

    pub fn fifo_len(&self) -> usize {
        self.fifo.len()
    }

    /// Takes one sample. Returns true if the interrupt line is asserted as a
    /// result.
    pub fn sample(&mut self) -> bool {
        if !self.is_sampling() {
            return false;
        }
        if self.fifo.push(encode(self.signal.next_sample())) {
            log::trace!("simulated fifo overflow");
        }

        let mut status = INT_PPG_RDY;
        if self.fifo.len() == self.almost_full_level() {
            status |= INT_A_FULL;
        }
        self.regs[reg::INT_STATUS_1 as usize] |= status;
        status & self.regs[reg::INT_ENABLE_1 as usize] != 0
    }

    fn write(&mut self, r: u8, value: u8) {
        match r {
            reg::MODE_CONFIG if value & MODE_RESET != 0 => {
                log::debug!("simulated sensor reset");
                self.power_on();
                self.regs[reg::INT_STATUS_1 as usize] = 0;
            }
            reg::FIFO_WR_PTR | reg::OVF_COUNTER | reg::FIFO_RD_PTR => self.fifo.clear(),
            reg::TEMP_CONFIG if value & 0x01 != 0 => {
                // Conversion completes immediately
                self.regs[reg::TEMP_INT as usize] = DIE_TEMP.0;
                self.regs[reg::TEMP_FRAC as usize] = DIE_TEMP.1;
                self.regs[reg::TEMP_CONFIG as usize] = 0;
                self.regs[reg::INT_STATUS_2 as usize] |= INT_DIE_TEMP_RDY;
            }
            reg::PART_ID | reg::REV_ID => {}
            _ => self.regs[r as usize] = value,
        }
    }

    fn read(&mut self, r: u8) -> u8 {
        match r {
            reg::INT_STATUS_1 | reg::INT_STATUS_2 => {
                core::mem::replace(&mut self.regs[r as usize], 0)
            }
            reg::FIFO_WR_PTR => self.fifo.write_ptr() as u8,
            reg::OVF_COUNTER => self.fifo.overflow_count(),
            reg::FIFO_RD_PTR => self.fifo.read_ptr() as u8,
            _ => self.regs[r as usize],
        }
    }

    fn read_burst(&mut self, r: u8, buf: &mut [u8]) {
        if r == reg::FIFO_DATA {
            // The data register does not auto-increment, every 6 bytes are
            // one FIFO entry. Reading an empty FIFO yields zeros.
            for chunk in buf.chunks_mut(6) {
                let frame = self.fifo.pop().unwrap_or_default();
                chunk.copy_from_slice(&frame[..chunk.len()]);
            }
        } else {
            for (i, b) in buf.iter_mut().enumerate() {
                *b = self.read(r.wrapping_add(i as u8));
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusError {
    /// No device at the addressed location.
    Nack,
    /// The sampling thread panicked while holding the device.
    Poisoned,
}

/// Handle to the simulated I2C bus the sensor sits on.
#[derive(Clone)]
pub struct SimBus {
    dev: Arc<Mutex<Device>>,
}

impl SimBus {
    fn with_device<R>(&self, addr: u8, f: impl FnOnce(&mut Device) -> R) -> Result<R, BusError> {
        if addr != ADDR {
            return Err(BusError::Nack);
        }
        let mut dev = self.dev.lock().map_err(|_| BusError::Poisoned)?;
        Ok(f(&mut dev))
    }
}

impl Write for SimBus {
    type Error = BusError;

    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError> {
        let Some((&r, values)) = bytes.split_first() else {
            return Ok(());
        };
        self.with_device(addr, |dev| {
            for (i, v) in values.iter().enumerate() {
                dev.write(r.wrapping_add(i as u8), *v);
            }
        })
    }
}

impl WriteRead for SimBus {
    type Error = BusError;

    fn write_read(&mut self, addr: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), BusError> {
        let r = bytes.first().copied().unwrap_or(0);
        self.with_device(addr, |dev| dev.read_burst(r, buffer))
    }
}

/// The simulated sensor: the device model plus its sample clock and
/// interrupt line.
pub struct Sensor {
    dev: Arc<Mutex<Device>>,
}

impl Sensor {
    pub fn new(device: Device) -> Self {
        Self {
            dev: Arc::new(Mutex::new(device)),
        }
    }

    pub fn bus(&self) -> SimBus {
        SimBus {
            dev: self.dev.clone(),
        }
    }

    /// Advances the sample clock by `n` ticks synchronously and signals
    /// `ready` on every interrupt. Returns the number of interrupts.
    pub fn step(&self, n: usize, ready: &DataReady) -> usize {
        let Ok(mut dev) = self.dev.lock() else {
            return 0;
        };
        let mut irqs = 0;
        for _ in 0..n {
            if dev.sample() {
                ready.signal();
                irqs += 1;
            }
        }
        irqs
    }

    /// Runs the sample clock at `rate` samples per second of wall time on a
    /// background thread.
    pub fn start_clock(&self, rate: f32, ready: &'static DataReady) -> JoinHandle<()> {
        let dev = self.dev.clone();
        std::thread::spawn(move || {
            let start = Instant::now();
            let mut produced = 0u64;
            loop {
                std::thread::sleep(Duration::from_millis(2));
                let due = (start.elapsed().as_secs_f64() * rate as f64) as u64;
                let Ok(mut dev) = dev.lock() else {
                    log::error!("sensor device poisoned, stopping clock");
                    return;
                };
                while produced < due {
                    if dev.sample() {
                        ready.signal();
                    }
                    produced += 1;
                }
            }
        })
    }
}
