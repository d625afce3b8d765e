use crate::source::SampleSource;

/// Pulls `oversampling` samples from `source` and returns the truncated mean of
/// their secondary channel.
///
/// The caller checks that at least `oversampling` samples are queued;
/// `oversampling` must be non-zero (see [`crate::Config::validate`]).
pub fn average<S: SampleSource>(source: &mut S, oversampling: usize) -> Result<u32, S::Error> {
    let mut sum: u64 = 0;
    for _ in 0..oversampling {
        sum += u64::from(source.pull()?.secondary);
    }
    Ok((sum / oversampling as u64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RawSample;

    struct Queue(std::collections::VecDeque<RawSample>);

    impl SampleSource for Queue {
        type Error = ();

        fn available(&mut self) -> Result<usize, ()> {
            Ok(self.0.len())
        }

        fn pull(&mut self) -> Result<RawSample, ()> {
            self.0.pop_front().ok_or(())
        }
    }

    fn queue(vals: &[u32]) -> Queue {
        Queue(vals.iter().map(|v| RawSample::new(7, *v)).collect())
    }

    #[test]
    fn truncating_mean_of_secondary_channel() {
        let mut q = queue(&[10, 11, 11, 11, 100]);
        assert_eq!(average(&mut q, 4), Ok(10));
        assert_eq!(q.0.len(), 1);
    }

    #[test]
    fn single_sample_passes_through() {
        let mut q = queue(&[0x03FFFF]);
        assert_eq!(average(&mut q, 1), Ok(0x03FFFF));
    }

    #[test]
    fn no_overflow_at_full_scale() {
        let mut q = queue(&[0x03FFFF; 64]);
        assert_eq!(average(&mut q, 64), Ok(0x03FFFF));
    }

    #[test]
    fn propagates_source_errors() {
        let mut q = queue(&[1, 2]);
        assert_eq!(average(&mut q, 3), Err(()));
    }
}
