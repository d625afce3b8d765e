#![cfg_attr(not(test), no_std)]

/// Number of unread entries between a write and a read pointer of a circular
/// buffer with `depth` slots.
///
/// Equal pointers read as empty. A buffer that is completely full looks the
/// same, so callers that can overflow need a separate overflow indication.
pub const fn fill_level(write_ptr: u8, read_ptr: u8, depth: u8) -> u8 {
    if write_ptr >= read_ptr {
        write_ptr - read_ptr
    } else {
        (depth - read_ptr) + write_ptr
    }
}

/// Circular buffer modelled after a sensor FIFO: a write pointer, a read
/// pointer and an overflow counter. When full, new values overwrite the oldest
/// unread value (rollover) and bump the overflow counter.
pub struct Fifo<const N: usize, T> {
    slots: [T; N],
    write_ptr: usize,
    read_ptr: usize,
    len: usize,
    overflow: u8,
}

impl<const N: usize, T: Default> Default for Fifo<N, T> {
    fn default() -> Self {
        Self {
            slots: core::array::from_fn(|_| Default::default()),
            write_ptr: 0,
            read_ptr: 0,
            len: 0,
            overflow: 0,
        }
    }
}

impl<const N: usize, T: Copy> Fifo<N, T> {
    /// Appends `v`. Returns true if an unread value was overwritten.
    pub fn push(&mut self, v: T) -> bool {
        self.slots[self.write_ptr] = v;
        self.write_ptr = (self.write_ptr + 1) % N;

        if self.len == N {
            // Rollover: the oldest value is gone, the reader skips past it.
            self.read_ptr = self.write_ptr;
            self.overflow = self.overflow.saturating_add(1);
            true
        } else {
            self.len += 1;
            false
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let v = self.slots[self.read_ptr];
        self.read_ptr = (self.read_ptr + 1) % N;
        self.len -= 1;
        // Reading makes room again, like the hardware clearing OVF on a data read.
        self.overflow = 0;
        Some(v)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub fn write_ptr(&self) -> usize {
        self.write_ptr
    }

    pub fn read_ptr(&self) -> usize {
        self.read_ptr
    }

    pub fn overflow_count(&self) -> u8 {
        self.overflow
    }

    pub fn clear(&mut self) {
        self.write_ptr = 0;
        self.read_ptr = 0;
        self.len = 0;
        self.overflow = 0;
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn run_test_fill_level(write_ptr: u8, read_ptr: u8, expected: u8) {
        assert_eq!(fill_level(write_ptr, read_ptr, 32), expected);
    }

    #[test]
    fn test_fill_level() {
        // No wrap
        run_test_fill_level(0, 0, 0);
        run_test_fill_level(10, 4, 6);
        run_test_fill_level(31, 0, 31);

        // Write pointer wrapped around
        run_test_fill_level(3, 30, 5);
        run_test_fill_level(0, 1, 31);
    }

    #[test]
    fn test_fifo_order() {
        let mut fifo = Fifo::<4, u32>::default();
        assert!(fifo.is_empty());
        assert_eq!(fifo.pop(), None);

        fifo.push(1);
        fifo.push(2);
        fifo.push(3);
        assert_eq!(fifo.len(), 3);
        assert_eq!(fifo.pop(), Some(1));

        fifo.push(4);
        fifo.push(5);
        assert!(fifo.is_full());
        assert_eq!(fifo.pop(), Some(2));
        assert_eq!(fifo.pop(), Some(3));
        assert_eq!(fifo.pop(), Some(4));
        assert_eq!(fifo.pop(), Some(5));
        assert_eq!(fifo.pop(), None);
    }

    #[test]
    fn test_fifo_rollover() {
        let mut fifo = Fifo::<4, u32>::default();
        for v in 0..4 {
            assert!(!fifo.push(v));
        }
        assert_eq!(fifo.overflow_count(), 0);
        assert_eq!(fifo.write_ptr(), fifo.read_ptr());

        assert!(fifo.push(4));
        assert!(fifo.push(5));
        assert_eq!(fifo.overflow_count(), 2);
        assert_eq!(fifo.len(), 4);

        // Oldest two were overwritten.
        assert_eq!(fifo.pop(), Some(2));
        assert_eq!(fifo.overflow_count(), 0);
        assert_eq!(fifo.pop(), Some(3));
        assert_eq!(fifo.pop(), Some(4));
        assert_eq!(fifo.pop(), Some(5));
    }

    #[test]
    fn test_fifo_pointers_match_fill_level() {
        let mut fifo = Fifo::<32, u32>::default();
        for v in 0..40 {
            fifo.push(v);
            if !fifo.is_full() {
                let level = fill_level(fifo.write_ptr() as u8, fifo.read_ptr() as u8, 32);
                assert_eq!(level as usize, fifo.len());
            }
            if v % 3 == 0 {
                fifo.pop();
            }
        }
        fifo.clear();
        assert!(fifo.is_empty());
        assert_eq!(fifo.write_ptr(), 0);
    }
}
