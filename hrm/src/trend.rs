//! Triplet trend filter.
//!
//! Groups smoothed values in threes and emits one representative value per
//! group. How the representative is chosen is selected by [`TrendPolicy`].

use core::cmp::Ordering;

use crate::config::TRIPLET;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrendPolicy {
    /// Always emit the newest value of the triplet. The filter then only
    /// decimates by three.
    #[default]
    PassThrough,
    /// Emit the middle value when the triplet reverses direction (a turning
    /// point), the newest value otherwise.
    TurningPoint,
}

fn direction(from: u32, to: u32) -> i8 {
    match to.cmp(&from) {
        Ordering::Greater => 1,
        Ordering::Less => -1,
        Ordering::Equal => 0,
    }
}

/// Picks the representative of `[a, b, c]` (oldest first).
pub fn trend(values: [u32; TRIPLET], policy: TrendPolicy) -> u32 {
    let [a, b, c] = values;
    let ab = direction(a, b);
    let bc = direction(b, c);

    match policy {
        TrendPolicy::PassThrough => c,
        TrendPolicy::TurningPoint => {
            if ab != 0 && bc != 0 && ab != bc {
                b
            } else {
                c
            }
        }
    }
}

/// Accumulates smoothed values and runs [`trend`] on every completed triplet.
pub struct TripletFilter {
    values: [u32; TRIPLET],
    filled: usize,
    policy: TrendPolicy,
}

impl TripletFilter {
    pub fn new(policy: TrendPolicy) -> Self {
        Self {
            values: [0; TRIPLET],
            filled: 0,
            policy,
        }
    }

    pub fn add(&mut self, v: u32) -> Option<u32> {
        self.values[self.filled] = v;
        self.filled += 1;
        if self.filled < TRIPLET {
            return None;
        }

        let out = trend(self.values, self.policy);
        self.values = [0; TRIPLET];
        self.filled = 0;
        Some(out)
    }

    /// Drops a partially collected triplet.
    pub fn reset(&mut self) {
        self.values = [0; TRIPLET];
        self.filled = 0;
    }
}
