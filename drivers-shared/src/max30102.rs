use bytemuck::Zeroable;
use embedded_hal::blocking::i2c::{Write, WriteRead};
use hrm::{RawSample, SampleSource};

pub const ADDR: u8 = 0x57;
pub const PART_ID: u8 = 0x15;
pub const FIFO_DEPTH: u8 = 32;

// Upper bound on MODE reads while waiting for the reset bit to clear.
const RESET_POLLS: usize = 100;

pub mod reg {
    pub const INT_STATUS_1: u8 = 0x00;
    pub const INT_STATUS_2: u8 = 0x01;
    pub const INT_ENABLE_1: u8 = 0x02;
    pub const INT_ENABLE_2: u8 = 0x03;
    pub const FIFO_WR_PTR: u8 = 0x04;
    pub const OVF_COUNTER: u8 = 0x05;
    pub const FIFO_RD_PTR: u8 = 0x06;
    pub const FIFO_DATA: u8 = 0x07;
    pub const FIFO_CONFIG: u8 = 0x08;
    pub const MODE_CONFIG: u8 = 0x09;
    pub const SPO2_CONFIG: u8 = 0x0A;
    pub const LED1_PA: u8 = 0x0C;
    pub const LED2_PA: u8 = 0x0D;
    pub const TEMP_INT: u8 = 0x1F;
    pub const TEMP_FRAC: u8 = 0x20;
    pub const TEMP_CONFIG: u8 = 0x21;
    pub const REV_ID: u8 = 0xFE;
    pub const PART_ID: u8 = 0xFF;
}

// INT_STATUS_1 / INT_ENABLE_1
pub const INT_A_FULL: u8 = 0x80;
pub const INT_PPG_RDY: u8 = 0x40;
pub const INT_ALC_OVF: u8 = 0x20;
pub const INT_PWR_RDY: u8 = 0x01;
// INT_STATUS_2 / INT_ENABLE_2
pub const INT_DIE_TEMP_RDY: u8 = 0x02;

pub const MODE_SHDN: u8 = 0x80;
pub const MODE_RESET: u8 = 0x40;
const MODE_MASK: u8 = 0x07;
const FIFO_ROLLOVER: u8 = 0x10;
const FIFO_A_FULL_MASK: u8 = 0x0F;
const TEMP_EN: u8 = 0x01;

pub const DEFAULT_LED_CURRENT: u8 = 0x60;

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    I2c(E),
    /// Something answered, but it is not a MAX30102.
    DeviceAbsent { part_id: u8 },
    InvalidArgument,
    /// The device did not come out of reset.
    ResetTimeout,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, num_enum::TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    HeartRate = 0x02,
    SpO2 = 0x03,
    MultiLed = 0x07,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SampleAveraging {
    Avg1 = 0x00,
    Avg2 = 0x20,
    Avg4 = 0x40,
    Avg8 = 0x60,
    Avg16 = 0x80,
    Avg32 = 0xA0,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdcRange {
    Na2048 = 0x00,
    Na4096 = 0x20,
    Na8192 = 0x40,
    Na16384 = 0x60,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SampleRate {
    Sps50 = 0x00,
    Sps100 = 0x04,
    Sps200 = 0x08,
    Sps400 = 0x0C,
    Sps800 = 0x10,
    Sps1000 = 0x14,
    Sps1600 = 0x18,
    Sps3200 = 0x1C,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PulseWidth {
    Us69 = 0x00,
    Us118 = 0x01,
    Us215 = 0x02,
    Us411 = 0x03,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FifoConfig {
    pub averaging: SampleAveraging,
    pub rollover: bool,
    /// Number of free slots left when the almost-full interrupt fires (0..=15).
    pub almost_full: u8,
}

impl FifoConfig {
    pub fn to_reg(&self) -> u8 {
        self.averaging as u8
            | if self.rollover { FIFO_ROLLOVER } else { 0 }
            | self.almost_full & FIFO_A_FULL_MASK
    }

    /// Unread samples at which the almost-full interrupt fires.
    pub fn almost_full_level(&self) -> u8 {
        FIFO_DEPTH - (self.almost_full & FIFO_A_FULL_MASK)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Spo2Config {
    pub adc_range: AdcRange,
    pub sample_rate: SampleRate,
    pub pulse_width: PulseWidth,
}

impl Spo2Config {
    pub fn to_reg(&self) -> u8 {
        self.adc_range as u8 | self.sample_rate as u8 | self.pulse_width as u8
    }
}

/// Register values written by [`Max30102::setup_for_heart_rate_monitoring`].
pub const HEART_RATE_SPO2: Spo2Config = Spo2Config {
    adc_range: AdcRange::Na16384,
    sample_rate: SampleRate::Sps1000,
    pulse_width: PulseWidth::Us215,
};

pub const HEART_RATE_FIFO: FifoConfig = FifoConfig {
    averaging: SampleAveraging::Avg1,
    rollover: true,
    almost_full: 2,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FifoPointers {
    pub write: u8,
    pub overflow: u8,
    pub read: u8,
}

impl FifoPointers {
    /// Unread samples. Equal pointers with a non-zero overflow counter mean
    /// the FIFO wrapped and is full.
    pub fn available(&self) -> u8 {
        if self.overflow != 0 && self.write == self.read {
            FIFO_DEPTH
        } else {
            util::fill_level(self.write, self.read, FIFO_DEPTH)
        }
    }
}

/// One FIFO entry in HR/SpO2 mode: red then IR, 3 bytes big endian each.
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
struct FifoFrame {
    red: [u8; 3],
    ir: [u8; 3],
}

fn be24(b: [u8; 3]) -> u32 {
    u32::from_be_bytes([0, b[0], b[1], b[2]])
}

impl FifoFrame {
    fn decode(&self) -> RawSample {
        RawSample::new(be24(self.red), be24(self.ir))
    }
}

pub struct Max30102<I2C> {
    i2c: I2C,
}

impl<I2C, E> Max30102<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        self.i2c.write(ADDR, &[reg, value]).map_err(Error::I2c)
    }

    fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c.write_read(ADDR, &[reg], buf).map_err(Error::I2c)
    }

    fn read_register(&mut self, reg: u8) -> Result<u8, Error<E>> {
        let mut res = 0;
        self.read_registers(reg, core::slice::from_mut(&mut res))?;
        Ok(res)
    }

    fn update_register(&mut self, reg: u8, f: impl FnOnce(u8) -> u8) -> Result<(), Error<E>> {
        let v = self.read_register(reg)?;
        self.write_register(reg, f(v))
    }

    pub fn part_id(&mut self) -> Result<u8, Error<E>> {
        self.read_register(reg::PART_ID)
    }

    pub fn revision_id(&mut self) -> Result<u8, Error<E>> {
        self.read_register(reg::REV_ID)
    }

    pub fn check_part_id(&mut self) -> Result<(), Error<E>> {
        let part_id = self.part_id()?;
        if part_id != PART_ID {
            log::error!("unexpected part id {:#04x}", part_id);
            return Err(Error::DeviceAbsent { part_id });
        }
        Ok(())
    }

    /// Resets all registers to power-on state and waits for the reset bit to
    /// self-clear.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.write_register(reg::MODE_CONFIG, MODE_RESET)?;
        for _ in 0..RESET_POLLS {
            if self.read_register(reg::MODE_CONFIG)? & MODE_RESET == 0 {
                return Ok(());
            }
        }
        Err(Error::ResetTimeout)
    }

    pub fn shutdown(&mut self) -> Result<(), Error<E>> {
        self.update_register(reg::MODE_CONFIG, |m| m | MODE_SHDN)
    }

    pub fn wakeup(&mut self) -> Result<(), Error<E>> {
        self.update_register(reg::MODE_CONFIG, |m| m & !MODE_SHDN)
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), Error<E>> {
        self.update_register(reg::MODE_CONFIG, |m| (m & !MODE_MASK) | mode as u8)
    }

    /// Reads back the active mode. A mode field the chip does not define is
    /// reported as [`Error::InvalidArgument`].
    pub fn mode(&mut self) -> Result<Mode, Error<E>> {
        let m = self.read_register(reg::MODE_CONFIG)? & MODE_MASK;
        Mode::try_from(m).map_err(|_| Error::InvalidArgument)
    }

    pub fn set_spo2_config(&mut self, config: Spo2Config) -> Result<(), Error<E>> {
        self.write_register(reg::SPO2_CONFIG, config.to_reg())
    }

    pub fn set_fifo_config(&mut self, config: FifoConfig) -> Result<(), Error<E>> {
        if config.almost_full > FIFO_A_FULL_MASK {
            return Err(Error::InvalidArgument);
        }
        self.write_register(reg::FIFO_CONFIG, config.to_reg())
    }

    pub fn set_led_current(&mut self, red: u8, ir: u8) -> Result<(), Error<E>> {
        self.write_register(reg::LED1_PA, red)?;
        self.write_register(reg::LED2_PA, ir)
    }

    pub fn set_interrupts(&mut self, enable_1: u8, enable_2: u8) -> Result<(), Error<E>> {
        self.write_register(reg::INT_ENABLE_1, enable_1)?;
        self.write_register(reg::INT_ENABLE_2, enable_2)
    }

    pub fn enable_almost_full_interrupt(&mut self) -> Result<(), Error<E>> {
        self.update_register(reg::INT_ENABLE_1, |v| v | INT_A_FULL)
    }

    pub fn disable_almost_full_interrupt(&mut self) -> Result<(), Error<E>> {
        self.update_register(reg::INT_ENABLE_1, |v| v & !INT_A_FULL)
    }

    pub fn enable_data_ready_interrupt(&mut self) -> Result<(), Error<E>> {
        self.update_register(reg::INT_ENABLE_1, |v| v | INT_PPG_RDY)
    }

    pub fn disable_data_ready_interrupt(&mut self) -> Result<(), Error<E>> {
        self.update_register(reg::INT_ENABLE_1, |v| v & !INT_PPG_RDY)
    }

    /// Both status registers. Reading them clears them on the device.
    pub fn interrupt_status(&mut self) -> Result<(u8, u8), Error<E>> {
        let mut buf = [0u8; 2];
        self.read_registers(reg::INT_STATUS_1, &mut buf)?;
        Ok((buf[0], buf[1]))
    }

    pub fn clear_interrupts(&mut self) -> Result<(), Error<E>> {
        self.interrupt_status().map(|_| ())
    }

    pub fn fifo_pointers(&mut self) -> Result<FifoPointers, Error<E>> {
        let mut buf = [0u8; 3];
        self.read_registers(reg::FIFO_WR_PTR, &mut buf)?;
        Ok(FifoPointers {
            write: buf[0],
            overflow: buf[1],
            read: buf[2],
        })
    }

    pub fn available_samples(&mut self) -> Result<u8, Error<E>> {
        let ptrs = self.fifo_pointers()?;
        if ptrs.overflow != 0 {
            log::warn!("fifo overflowed, {} samples lost", ptrs.overflow);
        }
        Ok(ptrs.available())
    }

    pub fn clear_fifo(&mut self) -> Result<(), Error<E>> {
        self.write_register(reg::FIFO_WR_PTR, 0)?;
        self.write_register(reg::OVF_COUNTER, 0)?;
        self.write_register(reg::FIFO_RD_PTR, 0)
    }

    /// Pops the oldest sample. The caller is responsible for checking
    /// [`Self::available_samples`] first.
    pub fn read_sample(&mut self) -> Result<RawSample, Error<E>> {
        let mut frame = FifoFrame::zeroed();
        self.read_registers(reg::FIFO_DATA, bytemuck::bytes_of_mut(&mut frame))?;
        Ok(frame.decode())
    }

    /// Reads as many queued samples as fit into `out` in one burst and returns
    /// how many were read.
    pub fn read_fifo_samples(&mut self, out: &mut [RawSample]) -> Result<usize, Error<E>> {
        let n = (self.available_samples()? as usize).min(out.len());
        let mut frames = [FifoFrame::zeroed(); FIFO_DEPTH as usize];
        let frames = &mut frames[..n];
        self.read_registers(reg::FIFO_DATA, bytemuck::cast_slice_mut(frames))?;
        for (o, f) in out.iter_mut().zip(frames.iter()) {
            *o = f.decode();
        }
        Ok(n)
    }

    /// Starts a single die temperature conversion.
    pub fn start_temperature(&mut self) -> Result<(), Error<E>> {
        self.write_register(reg::TEMP_CONFIG, TEMP_EN)
    }

    /// Die temperature in °C, or `None` while a conversion is still running.
    pub fn temperature(&mut self) -> Result<Option<f32>, Error<E>> {
        if self.read_register(reg::TEMP_CONFIG)? & TEMP_EN != 0 {
            return Ok(None);
        }
        let mut buf = [0u8; 2];
        self.read_registers(reg::TEMP_INT, &mut buf)?;
        let int = buf[0] as i8 as f32;
        let frac = (buf[1] & 0x0F) as f32 * 0.0625;
        Ok(Some(int + frac))
    }

    /// Identifies the chip and configures it for red+IR sampling at 1 kHz
    /// with an almost-full interrupt at 30 queued samples.
    pub fn setup_for_heart_rate_monitoring(&mut self) -> Result<(), Error<E>> {
        self.setup(Mode::HeartRate)
    }

    pub fn setup_for_spo2_monitoring(&mut self) -> Result<(), Error<E>> {
        self.setup(Mode::SpO2)
    }

    fn setup(&mut self, mode: Mode) -> Result<(), Error<E>> {
        self.check_part_id()?;
        self.reset()?;
        self.set_mode(mode)?;
        self.set_spo2_config(HEART_RATE_SPO2)?;
        self.set_fifo_config(HEART_RATE_FIFO)?;
        self.set_interrupts(INT_A_FULL, 0)?;
        self.clear_interrupts()?;
        self.clear_fifo()?;
        self.set_led_current(DEFAULT_LED_CURRENT, DEFAULT_LED_CURRENT)?;
        log::info!("max30102 ready in {:?} mode", mode);
        Ok(())
    }
}

impl<I2C, E> SampleSource for Max30102<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    type Error = Error<E>;

    fn available(&mut self) -> Result<usize, Self::Error> {
        self.available_samples().map(usize::from)
    }

    fn pull(&mut self) -> Result<RawSample, Self::Error> {
        self.read_sample()
    }
}
