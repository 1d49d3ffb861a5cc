//! Stable equal-population quantile bucketing.

use std::cmp::Ordering;

use crate::MathError;

/// Assign each value a bucket label `1..=n_buckets` by rank, with
/// near-equal populations (sizes differ by at most one when the count is
/// not evenly divisible).
///
/// The rank order is a stable sort on value: values that compare equal keep
/// their input order, so ties at a bucket boundary resolve identically on
/// every run regardless of any hash state. With `descending`, bucket 1
/// holds the largest values.
///
/// # Errors
/// Returns `MathError::InvalidBucketCount` if `n_buckets` is 0.
pub fn quantile_buckets(
    values: &[f64],
    n_buckets: u32,
    descending: bool,
) -> Result<Vec<u32>, MathError> {
    if n_buckets == 0 {
        return Err(MathError::InvalidBucketCount);
    }
    let n = values.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut order: Vec<usize> = (0..n).collect();
    // sort_by is stable: equal values keep insertion order.
    order.sort_by(|&a, &b| {
        let cmp = values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal);
        if descending { cmp.reverse() } else { cmp }
    });

    let mut labels = vec![0_u32; n];
    for (rank, &i) in order.iter().enumerate() {
        labels[i] = (rank as u64 * u64::from(n_buckets) / n as u64) as u32 + 1;
    }
    Ok(labels)
}

/// Ranks (1-based) with ties assigned the average of the ranks they span.
#[must_use]
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0_f64; n];
    let mut start = 0;
    while start < n {
        let mut end = start + 1;
        while end < n && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // ranks start+1 ..= end, averaged over the tie run
        let avg = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = avg;
        }
        start = end;
    }
    ranks
}
