use hrm::{AlertCode, AlertSink};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BuzzCmd {
    On,
    Off,
    /// Alternating on/off durations in ms, starting with on. A zero ends the
    /// pattern early.
    Pattern([u8; 7]),
}

pub fn alert_pattern(code: AlertCode) -> [u8; 7] {
    match code {
        AlertCode::InitFailure => [250, 100, 250, 100, 250, 0, 0],
        AlertCode::BpmOutOfRange => [60, 60, 60, 0, 0, 0, 0],
    }
}

pub struct Buzzer {
    last: Option<BuzzCmd>,
}

impl Buzzer {
    pub fn new() -> Self {
        Self { last: None }
    }

    pub fn pattern(&mut self, pat: [u8; 7]) {
        self.send_cmd(BuzzCmd::Pattern(pat));
    }

    pub fn last(&self) -> Option<BuzzCmd> {
        self.last
    }

    fn send_cmd(&mut self, cmd: BuzzCmd) {
        println!("Buzz: {:?}", cmd);
        self.last = Some(cmd);
    }
}

impl Default for Buzzer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertSink for Buzzer {
    fn alert(&mut self, code: AlertCode) {
        log::warn!("alert {:?} (code {})", code, code as u8);
        self.pattern(alert_pattern(code));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_are_distinguishable() {
        let a = alert_pattern(AlertCode::InitFailure);
        let b = alert_pattern(AlertCode::BpmOutOfRange);
        assert_ne!(a, b);
        for pat in [a, b] {
            assert_ne!(pat[0], 0);
        }
    }

    #[test]
    fn alert_plays_pattern() {
        let mut buzz = Buzzer::new();
        buzz.alert(AlertCode::BpmOutOfRange);
        assert_eq!(
            buzz.last(),
            Some(BuzzCmd::Pattern(alert_pattern(AlertCode::BpmOutOfRange)))
        );
    }
}
