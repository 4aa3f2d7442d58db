//! Small utilities to manage bounded history buffers for charts.

use std::collections::VecDeque;

/// Samples kept per sparkline.
pub const SPARK_CAP: usize = 600;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// Tail of `hist` that fits in `width` columns.
pub fn visible_tail(hist: &VecDeque<u64>, width: usize) -> Vec<u64> {
    let start = hist.len().saturating_sub(width);
    hist.iter().skip(start).copied().collect()
}
