use arrform::{arrform, ArrForm};
use hrm::BpmDisplay;

pub fn format_bpm(whole: u16, hundredths: u8) -> ArrForm<16> {
    arrform!(16, "{}.{:02} BPM", whole, hundredths)
}

/// Stands in for the watch screen: every redraw goes to stdout.
#[derive(Default)]
pub struct Display {
    redraws: usize,
}

impl Display {
    pub fn redraws(&self) -> usize {
        self.redraws
    }
}

impl BpmDisplay for Display {
    fn show_bpm(&mut self, whole: u16, hundredths: u8) {
        self.redraws += 1;
        println!("Display: {}", format_bpm(whole, hundredths).as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_hundredths() {
        assert_eq!(format_bpm(60, 48).as_str(), "60.48 BPM");
        assert_eq!(format_bpm(72, 5).as_str(), "72.05 BPM");
        assert_eq!(format_bpm(229, 0).as_str(), "229.00 BPM");
    }

    #[test]
    fn counts_redraws() {
        let mut d = Display::default();
        d.show_bpm(60, 0);
        d.show_bpm(61, 0);
        assert_eq!(d.redraws(), 2);
    }
}
