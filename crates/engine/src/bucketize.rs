//! Bucket assignment over a neutralized cross-section.

use factorbt_primitives::{BucketLabel, Direction};

use crate::{EngineError, NeutralizedRow};

/// Assign each row a bucket label: ranked stocks are cut into `n_buckets`
/// near-equal quantile buckets on their standardized value, excluded
/// stocks (degenerate or unneutralizable) get the reserved bucket.
///
/// With `Direction::Descending` bucket 1 holds the highest standardized
/// values. Ties break by input position, so assignment is deterministic.
/// Output labels align one-to-one with `rows`.
///
/// # Errors
/// Returns `EngineError` if `n_buckets` is zero.
pub fn assign_buckets(
    rows: &[NeutralizedRow],
    n_buckets: u32,
    direction: Direction,
) -> Result<Vec<BucketLabel>, EngineError> {
    let mut ranked_positions = Vec::with_capacity(rows.len());
    let mut values = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if let Some(neutralized) = &row.neutralized {
            ranked_positions.push(i);
            values.push(neutralized.standardized);
        }
    }

    let descending = matches!(direction, Direction::Descending);
    let ranks = factorbt_math::quantile_buckets(&values, n_buckets, descending)?;

    let mut labels = vec![BucketLabel::Excluded; rows.len()];
    for (&i, &rank) in ranked_positions.iter().zip(&ranks) {
        labels[i] = BucketLabel::Ranked(rank);
    }
    Ok(labels)
}
