/// Channel values are 18 bit ADC readings.
pub const SAMPLE_MASK: u32 = 0x03FFFF;

/// One FIFO entry: primary (red) and secondary (infrared) channel.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub primary: u32,
    pub secondary: u32,
}

impl RawSample {
    pub fn new(primary: u32, secondary: u32) -> Self {
        Self {
            primary: primary & SAMPLE_MASK,
            secondary: secondary & SAMPLE_MASK,
        }
    }
}

/// What the pipeline needs from the sensor driver.
pub trait SampleSource {
    type Error;

    /// Number of unread sample pairs currently queued in the device.
    fn available(&mut self) -> Result<usize, Self::Error>;

    /// Removes and returns the oldest queued sample pair.
    fn pull(&mut self) -> Result<RawSample, Self::Error>;
}

impl<S: SampleSource + ?Sized> SampleSource for &mut S {
    type Error = S::Error;

    fn available(&mut self) -> Result<usize, Self::Error> {
        (**self).available()
    }

    fn pull(&mut self) -> Result<RawSample, Self::Error> {
        (**self).pull()
    }
}
