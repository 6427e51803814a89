//! Pairwise statistical comparison of a primary SUT against a baseline.

/// Cohen's d magnitude band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

/// Cohen's d: the difference in means scaled by the pooled standard
/// deviation. `None` when either sample has fewer than two values.
pub fn cohens_d(primary: &[f64], baseline: &[f64]) -> Option<f64> {
    if primary.len() < 2 || baseline.len() < 2 {
        return None;
    }
    let mean_a = mean(primary);
    let mean_b = mean(baseline);
    let var_a = variance(primary, mean_a);
    let var_b = variance(baseline, mean_b);

    let n_a = primary.len() as f64;
    let n_b = baseline.len() as f64;
    let pooled_std = (((n_a - 1.0) * var_a + (n_b - 1.0) * var_b) / (n_a + n_b - 2.0)).sqrt();
    if pooled_std == 0.0 {
        return Some(0.0);
    }
    Some((mean_a - mean_b) / pooled_std)
}

pub fn cohens_d_magnitude(d: f64) -> EffectMagnitude {
    let d = d.abs();
    if d < 0.2 {
        EffectMagnitude::Negligible
    } else if d < 0.5 {
        EffectMagnitude::Small
    } else if d < 0.8 {
        EffectMagnitude::Medium
    } else {
        EffectMagnitude::Large
    }
}

/// Cliff's delta: `(#pairs primary > baseline - #pairs primary < baseline)
/// / (n_primary * n_baseline)`, a non-parametric dominance measure in
/// `[-1, 1]`. Rank-biserial correlation on the same two samples is computed
/// identically (both reduce to the same pairwise-dominance count), so
/// `rank_biserial` below just calls through.
pub fn cliffs_delta(primary: &[f64], baseline: &[f64]) -> f64 {
    if primary.is_empty() || baseline.is_empty() {
        return 0.0;
    }
    let mut dominance = 0i64;
    for &a in primary {
        for &b in baseline {
            if a > b {
                dominance += 1;
            } else if a < b {
                dominance -= 1;
            }
        }
    }
    dominance as f64 / (primary.len() * baseline.len()) as f64
}

pub fn rank_biserial(primary: &[f64], baseline: &[f64]) -> f64 {
    cliffs_delta(primary, baseline)
}

pub fn nonparametric_magnitude(delta: f64) -> EffectMagnitude {
    let delta = delta.abs();
    if delta < 0.147 {
        EffectMagnitude::Negligible
    } else if delta < 0.33 {
        EffectMagnitude::Small
    } else if delta < 0.474 {
        EffectMagnitude::Medium
    } else {
        EffectMagnitude::Large
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Standard normal CDF via the Abramowitz-Stegun erf approximation.
fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    // Abramowitz & Stegun 7.1.26, max error ~1.5e-7.
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let a1 = 0.254_829_592;
    let a2 = -0.284_496_736;
    let a3 = 1.421_413_741;
    let a4 = -1.453_152_027;
    let a5 = 1.061_405_429;
    let p = 0.327_591_1;

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}

fn ranks(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < indexed.len() {
        let mut j = i;
        while j + 1 < indexed.len() && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for item in indexed.iter().take(j + 1).skip(i) {
            ranks[item.0] = avg_rank;
        }
        i = j + 1;
    }
    ranks
}

/// Two-sided Wilcoxon signed-rank test p-value on paired differences,
/// using the normal approximation. Exact small-`n` tables would be more
/// accurate but are not required here.
pub fn wilcoxon_signed_rank_p(primary: &[f64], baseline: &[f64]) -> Option<f64> {
    if primary.len() != baseline.len() || primary.is_empty() {
        return None;
    }
    let diffs: Vec<f64> = primary
        .iter()
        .zip(baseline.iter())
        .map(|(a, b)| a - b)
        .filter(|d| *d != 0.0)
        .collect();
    let n = diffs.len();
    if n == 0 {
        return Some(1.0);
    }

    let abs_diffs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let signed_ranks = ranks(&abs_diffs);

    let w_plus: f64 = diffs
        .iter()
        .zip(signed_ranks.iter())
        .filter(|(d, _)| **d > 0.0)
        .map(|(_, r)| r)
        .sum();

    let n_f = n as f64;
    let mean_w = n_f * (n_f + 1.0) / 4.0;
    let std_w = (n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0).sqrt();
    if std_w == 0.0 {
        return Some(1.0);
    }
    let z = (w_plus - mean_w) / std_w;
    Some(2.0 * (1.0 - normal_cdf(z.abs())))
}

/// Two-sided Mann-Whitney U test p-value on two unpaired samples, using
/// the normal approximation. Also returns the U statistic.
pub fn mann_whitney_u(primary: &[f64], baseline: &[f64]) -> Option<(f64, f64)> {
    if primary.is_empty() || baseline.is_empty() {
        return None;
    }
    let n1 = primary.len() as f64;
    let n2 = baseline.len() as f64;

    let combined_ranks = ranks(&{
        let mut all = primary.to_vec();
        all.extend_from_slice(baseline);
        all
    });

    let rank_sum_primary: f64 = combined_ranks.iter().take(primary.len()).sum();
    let u1 = rank_sum_primary - n1 * (n1 + 1.0) / 2.0;
    let u2 = n1 * n2 - u1;
    let u = u1.min(u2);

    let mean_u = n1 * n2 / 2.0;
    let std_u = (n1 * n2 * (n1 + n2 + 1.0) / 12.0).sqrt();
    if std_u == 0.0 {
        return Some((u, 1.0));
    }
    let z = (u - mean_u) / std_u;
    let p = 2.0 * (1.0 - normal_cdf(z.abs()));
    Some((u, p))
}

/// Select the paired (Wilcoxon) or unpaired (Mann-Whitney) test depending
/// on whether repetitions align.
pub fn p_value(primary: &[f64], baseline: &[f64]) -> Option<f64> {
    if primary.len() == baseline.len() && !primary.is_empty() {
        wilcoxon_signed_rank_p(primary, baseline)
    } else {
        mann_whitney_u(primary, baseline).map(|(_, p)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_series_has_p_one_and_zero_effect() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(p_value(&series, &series), Some(1.0));
        assert_eq!(cohens_d(&series, &series), Some(0.0));
    }

    #[test]
    fn constant_shift_is_significant_at_n20() {
        let primary: Vec<f64> = (0..20).map(|i| 1.0 + i as f64 * 0.01).collect();
        let baseline: Vec<f64> = (0..20).map(|i| 0.5 + i as f64 * 0.01).collect();
        let p = p_value(&primary, &baseline).unwrap();
        assert!(p < 0.05, "expected significant p-value, got {p}");
    }

    #[test]
    fn cohens_d_undefined_below_two_samples() {
        assert_eq!(cohens_d(&[1.0], &[1.0, 2.0]), None);
    }

    #[test]
    fn cliffs_delta_full_dominance_is_one() {
        assert_eq!(cliffs_delta(&[10.0, 11.0], &[1.0, 2.0]), 1.0);
        assert_eq!(cliffs_delta(&[1.0, 2.0], &[10.0, 11.0]), -1.0);
    }

    #[test]
    fn magnitude_bands_match_thresholds() {
        assert_eq!(cohens_d_magnitude(0.1), EffectMagnitude::Negligible);
        assert_eq!(cohens_d_magnitude(0.3), EffectMagnitude::Small);
        assert_eq!(cohens_d_magnitude(0.6), EffectMagnitude::Medium);
        assert_eq!(cohens_d_magnitude(1.0), EffectMagnitude::Large);

        assert_eq!(nonparametric_magnitude(0.1), EffectMagnitude::Negligible);
        assert_eq!(nonparametric_magnitude(0.2), EffectMagnitude::Small);
        assert_eq!(nonparametric_magnitude(0.4), EffectMagnitude::Medium);
        assert_eq!(nonparametric_magnitude(0.8), EffectMagnitude::Large);
    }
}
