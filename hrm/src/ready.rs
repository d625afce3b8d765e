use core::sync::atomic::{AtomicBool, Ordering};

/// "FIFO data ready" flag shared between the sensor interrupt and the main
/// loop.
///
/// The interrupt handler only calls [`DataReady::signal`]; the main loop only
/// calls [`DataReady::take`]. Both are single atomic loads/stores, so this
/// works on cores without compare-and-swap.
pub struct DataReady {
    flag: AtomicBool,
}

impl DataReady {
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    /// Interrupt side. Does nothing but set the flag.
    pub fn signal(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Main loop side: returns whether the flag was set, clearing it.
    ///
    /// Must be called before draining the sensor. A signal raised while
    /// draining then stays set for the next iteration, and one raised between
    /// the load and the store is covered by the drain that follows, which
    /// reads the FIFO level only after this returns.
    pub fn take(&self) -> bool {
        if self.flag.load(Ordering::Acquire) {
            self.flag.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }
}

impl Default for DataReady {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears() {
        let ready = DataReady::new();
        assert!(!ready.take());

        ready.signal();
        ready.signal();
        assert!(ready.is_set());
        assert!(ready.take());
        assert!(!ready.take());
    }

    #[test]
    fn signal_during_drain_is_kept() {
        static READY: DataReady = DataReady::new();
        READY.signal();
        assert!(READY.take());

        // Interrupt fires while the main loop is still processing
        std::thread::spawn(|| READY.signal()).join().unwrap();

        assert!(READY.take());
    }
}
