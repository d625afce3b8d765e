use arrayvec::ArrayVec;

/// Scans `data` for troughs whose descent and subsequent recovery both reach
/// `threshold`, and stores their indices in `valleys` (cleared first).
///
/// A candidate starts where the signal first falls below its predecessor; the
/// value before the fall is the local high. The descent runs while values keep
/// falling. If the drop from the local high to the deepest point is at least
/// `threshold`, the scan continues until the signal rises to
/// `deepest + threshold`, following the trough further down if it deepens on
/// the way. Only troughs that clear that band before the end of `data` are
/// recorded.
///
/// Nothing is recorded for a zero threshold. Scanning stops early once
/// `valleys` is full.
pub fn find_valleys<const CAP: usize>(
    data: &[u32],
    threshold: u32,
    valleys: &mut ArrayVec<usize, CAP>,
) {
    valleys.clear();
    if threshold == 0 || data.len() < 3 {
        return;
    }

    let n = data.len();
    let mut i = 1;
    while i < n - 1 && !valleys.is_full() {
        if data[i] >= data[i - 1] {
            i += 1;
            continue;
        }

        let high = data[i - 1];
        let mut best = i;
        let mut deepest = data[i];

        i += 1;
        while i < n && data[i] < data[i - 1] {
            deepest = data[i];
            best = i;
            i += 1;
        }

        if high - deepest < threshold {
            continue;
        }

        let band = deepest.saturating_add(threshold);
        while i < n && data[i] < band {
            if data[i] < deepest {
                deepest = data[i];
                best = i;
            }
            i += 1;
        }

        if i < n {
            valleys.push(best);
        }
    }
}
