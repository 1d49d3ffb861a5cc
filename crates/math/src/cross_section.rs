//! Cross-sectional statistical operations.

use ndarray::Array1;

/// Sample standard deviation (ddof = 1). Returns 0 for fewer than two
/// observations.
#[must_use]
pub fn sample_std(data: &Array1<f64>) -> f64 {
    let n = data.len() as f64;
    if n <= 1.0 {
        return 0.0;
    }
    let mean = data.mean().unwrap_or(0.0);
    let variance: f64 = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Center (demean) a cross-section.
#[must_use]
pub fn demean(data: &Array1<f64>) -> Array1<f64> {
    if data.is_empty() {
        return data.clone();
    }
    let mean = data.mean().unwrap_or(0.0);
    data - mean
}

/// Subtract from each value the mean of its group.
///
/// `groups[i]` is the group key of `values[i]`. Single-member groups yield
/// a residual of 0 by construction. Group keys are dense indices supplied
/// by the caller, so the result is independent of any hash ordering.
#[must_use]
pub fn demean_by_group(values: &[f64], groups: &[u32]) -> Vec<f64> {
    debug_assert_eq!(values.len(), groups.len());
    let n_groups = groups.iter().copied().max().map_or(0, |g| g as usize + 1);
    let mut sums = vec![0.0_f64; n_groups];
    let mut counts = vec![0_usize; n_groups];
    for (&v, &g) in values.iter().zip(groups) {
        sums[g as usize] += v;
        counts[g as usize] += 1;
    }
    values
        .iter()
        .zip(groups)
        .map(|(&v, &g)| v - sums[g as usize] / counts[g as usize] as f64)
        .collect()
}

/// Cross-sectional z-score transform.
///
/// Uses the sample standard deviation. When the cross-section has zero
/// variance the output is all zeros rather than a division by zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZScore;

impl ZScore {
    /// Apply the z-score to a cross-section.
    #[must_use]
    pub fn apply(&self, data: &Array1<f64>) -> Array1<f64> {
        if data.is_empty() {
            return data.clone();
        }
        let centered = demean(data);
        let std = sample_std(data);
        if std > 0.0 { &centered / std } else { Array1::zeros(data.len()) }
    }
}
