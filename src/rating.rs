//! Generic top-N reducers used at session and profile scope.
//!
//! Two conventions exist for empty inputs and callers must not conflate
//! them: `average_of_best_n` is all-or-nothing (fewer than N values means
//! `None`, never a partial average), while `sum_of_best_n` has no minimum
//! count and returns 0.0 for an empty candidate set. Algorithms that want
//! "null when nothing qualifies" on top of the sum wrap it themselves.

use std::cmp::Ordering;

fn sorted_descending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    sorted
}

/// Averages the best `n` values, or `None` when fewer than `n` are present.
pub fn average_of_best_n(values: &[f64], n: usize) -> Option<f64> {
    if n == 0 || values.len() < n {
        return None;
    }

    let sorted = sorted_descending(values);
    let best = &sorted[..n];

    // n copies of the same value must average to exactly that value
    if best.iter().all(|v| *v == best[0]) {
        return Some(best[0]);
    }

    // single divide at the end; a running average accumulates drift
    let sum: f64 = best.iter().sum();
    Some(sum / n as f64)
}

/// Sums the best `n` available values. No minimum count: fewer than `n`
/// values sum what is there, and an empty slice sums to 0.0.
pub fn sum_of_best_n(values: &[f64], n: usize) -> f64 {
    let sorted = sorted_descending(values);
    sorted.iter().take(n).sum()
}
