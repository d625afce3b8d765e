use arrayvec::ArrayVec;

use crate::config::MAX_TOP_K;

/// Inserts `diff` into `top` (sorted descending, at most `k` entries) if it
/// belongs to the `k` largest seen so far.
fn insert_top_k(top: &mut ArrayVec<u32, MAX_TOP_K>, k: usize, diff: u32) {
    if top.len() == k {
        match top.last() {
            Some(&smallest) if diff > smallest => {
                top.pop();
            }
            _ => return,
        }
    }
    // Equal values keep their arrival order.
    let pos = top.iter().position(|&t| t < diff).unwrap_or(top.len());
    top.insert(pos, diff);
}

fn mean(sum: u64, count: u64) -> u64 {
    match count {
        1 => sum,
        2 => sum >> 1,
        4 => sum >> 2,
        8 => sum >> 3,
        _ => sum / count,
    }
}

/// Adaptive minimum variation: the truncated mean of the `k` largest absolute
/// differences between consecutive values of `data`.
///
/// Returns 0 if there are fewer than two values or `k` is zero; callers must
/// skip valley detection in that case. `k` is clamped to [`MAX_TOP_K`].
pub fn mean_largest_variations(data: &[u32], k: usize) -> u32 {
    if data.len() < 2 || k == 0 {
        return 0;
    }
    let k = k.min(MAX_TOP_K);

    let mut top = ArrayVec::<u32, MAX_TOP_K>::new();
    for pair in data.windows(2) {
        insert_top_k(&mut top, k, pair[0].abs_diff(pair[1]));
    }

    if top.is_empty() {
        return 0;
    }
    let sum: u64 = top.iter().map(|&d| u64::from(d)).sum();
    mean(sum, top.len() as u64) as u32
}
