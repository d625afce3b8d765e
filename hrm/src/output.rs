use crate::bpm::Bpm;

/// Receives BPM values worth showing, already split for display.
pub trait BpmDisplay {
    fn show_bpm(&mut self, whole: u16, hundredths: u8);
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertCode {
    /// Sensor identification failed at startup.
    InitFailure = 1,
    /// An estimate fell outside the plausible band.
    BpmOutOfRange = 2,
}

/// Translates alert codes into something a human notices. How (tones,
/// vibration timing, ...) is up to the implementation.
pub trait AlertSink {
    fn alert(&mut self, code: AlertCode);
}

/// Remembers what is on screen so unchanged values are not redrawn.
#[derive(Default)]
pub struct Readout {
    shown: Option<(u16, u8)>,
}

impl Readout {
    /// Returns the split value if `bpm` is an estimate and differs from what
    /// is currently shown.
    pub fn update(&mut self, bpm: Bpm) -> Option<(u16, u8)> {
        if !bpm.is_estimate() {
            return None;
        }
        let split = bpm.split();
        if self.shown == Some(split) {
            return None;
        }
        self.shown = Some(split);
        Some(split)
    }

    pub fn shown(&self) -> Option<(u16, u8)> {
        self.shown
    }
}
