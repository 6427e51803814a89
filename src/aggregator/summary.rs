//! Per-metric summary statistics over a (SUT, case-class) partition.
//!
//! Sort-once, derive-mean/std/percentile-from-sorted-samples, generalized
//! from `Duration` bench samples to `f64` metric values, with one struct
//! per partition. Percentiles use linear interpolation between neighbours
//! rather than nearest-index truncation.

use crate::model::SummaryStats;

/// Compute `SummaryStats` over `values`. `std` is `None` when fewer than
/// two samples are present; all other fields are `0.0` for an empty slice
/// (callers should check `n` before trusting them).
pub fn summarize(values: &[f64]) -> SummaryStats {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    if n == 0 {
        return SummaryStats {
            n: 0,
            mean: 0.0,
            std: None,
            min: 0.0,
            max: 0.0,
            median: 0.0,
            q1: 0.0,
            q3: 0.0,
        };
    }

    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n < 2 {
        None
    } else {
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        Some(variance.sqrt())
    };

    SummaryStats {
        n,
        mean,
        std,
        min: sorted[0],
        max: sorted[n - 1],
        median: percentile(&sorted, 50.0),
        q1: percentile(&sorted, 25.0),
        q3: percentile(&sorted, 75.0),
    }
}

/// `p`th percentile of already-sorted `sorted`, linearly interpolated
/// between the two neighbouring ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}
