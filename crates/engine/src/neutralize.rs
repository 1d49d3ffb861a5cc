//! Industry and size neutralization, then standardization.
//!
//! Order is fixed: industry residuals first, size demeaning second.
//! Reversing it computes the size-group means on un-residualized data and
//! changes the result. Each step is a pure function of the current
//! period's cross-section; nothing here looks across periods.

use std::collections::BTreeMap;

use factorbt_primitives::{FactorRecord, IndustryId, NeutralizedFactor, StockId};
use ndarray::Array1;
use tracing::debug;

use crate::EngineError;

/// One stock's neutralization outcome.
///
/// `neutralized` is `None` for degenerate records (raw sentinel) and for
/// stocks missing a market cap, which cannot be size-neutralized; both are
/// routed to the excluded bucket downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct NeutralizedRow {
    /// Stock identifier.
    pub stock: StockId,
    /// Raw factor value carried through unchanged.
    pub raw: Option<f64>,
    /// Neutralization outputs, absent for excluded stocks.
    pub neutralized: Option<NeutralizedFactor>,
}

/// Neutralize one period's cross-section: industry residual, then size
/// demeaning over fresh quantile cuts, then a z-score (optionally sigma
/// clipped first).
///
/// Output rows align one-to-one with the input records, in input order.
/// Degenerate records pass through unchanged with `neutralized: None` and
/// are excluded from every mean computed here.
///
/// # Errors
/// Returns `EngineError` only for structural problems (invalid size
/// bucket count or sigma threshold); the degenerate cases are handled by
/// routing, not errors.
pub fn neutralize_cross_section(
    records: &[FactorRecord],
    industries: &BTreeMap<StockId, IndustryId>,
    market_caps: &BTreeMap<StockId, f64>,
    size_buckets: u32,
    sigma_clip: Option<f64>,
) -> Result<Vec<NeutralizedRow>, EngineError> {
    // Stocks that can be neutralized: non-degenerate with a market cap.
    let mut included: Vec<usize> = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if record.raw.is_some() && market_caps.contains_key(&record.stock) {
            included.push(i);
        }
    }

    if included.len() < records.len() {
        debug!(
            excluded = records.len() - included.len(),
            total = records.len(),
            "stocks excluded from neutralization"
        );
    }

    let unclassified = IndustryId::unclassified();
    let values: Vec<f64> = included.iter().map(|&i| records[i].raw.unwrap_or(0.0)).collect();

    // Dense industry group keys, assigned in sorted industry order so the
    // grouping is reproducible run to run.
    let mut group_ids: BTreeMap<&IndustryId, u32> = BTreeMap::new();
    for &i in &included {
        let industry = industries.get(&records[i].stock).unwrap_or(&unclassified);
        let next = group_ids.len() as u32;
        group_ids.entry(industry).or_insert(next);
    }
    let groups: Vec<u32> = included
        .iter()
        .map(|&i| group_ids[industries.get(&records[i].stock).unwrap_or(&unclassified)])
        .collect();
    let industry_residuals = factorbt_math::demean_by_group(&values, &groups);

    // Size buckets from fresh quantile cuts on the current period's caps;
    // stable tie-break by insertion order.
    let caps: Vec<f64> = included.iter().map(|&i| market_caps[&records[i].stock]).collect();
    let size_labels = factorbt_math::quantile_buckets(&caps, size_buckets, false)?;
    let size_groups: Vec<u32> = size_labels.iter().map(|&l| l - 1).collect();
    let size_adjusted = factorbt_math::demean_by_group(&industry_residuals, &size_groups);

    let mut adjusted = Array1::from_vec(size_adjusted.clone());
    if let Some(sigma) = sigma_clip {
        adjusted = factorbt_math::sigma_clip(&adjusted, sigma)?;
    }
    let standardized = factorbt_math::ZScore.apply(&adjusted);

    let mut outputs: Vec<Option<NeutralizedFactor>> = vec![None; records.len()];
    for (pos, &i) in included.iter().enumerate() {
        outputs[i] = Some(NeutralizedFactor {
            industry_residual: industry_residuals[pos],
            size_adjusted: size_adjusted[pos],
            standardized: standardized[pos],
        });
    }

    Ok(records
        .iter()
        .zip(outputs)
        .map(|(record, neutralized)| NeutralizedRow {
            stock: record.stock.clone(),
            raw: record.raw,
            neutralized,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use factorbt_primitives::Date;

    use super::*;

    fn date() -> Date {
        Date::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn record(id: &str, raw: Option<f64>) -> FactorRecord {
        FactorRecord::new(StockId::new(id), date(), raw)
    }

    fn setup(
        raws: &[(&str, Option<f64>, &str, f64)],
    ) -> (Vec<FactorRecord>, BTreeMap<StockId, IndustryId>, BTreeMap<StockId, f64>) {
        let records = raws.iter().map(|(id, raw, _, _)| record(id, *raw)).collect();
        let industries = raws
            .iter()
            .map(|(id, _, ind, _)| (StockId::new(*id), IndustryId::new(*ind)))
            .collect();
        let caps = raws.iter().map(|(id, _, _, cap)| (StockId::new(*id), *cap)).collect();
        (records, industries, caps)
    }

    #[test]
    fn industry_residuals_mean_zero_per_industry() {
        let (records, industries, caps) = setup(&[
            ("A", Some(1.0), "tech", 1e9),
            ("B", Some(3.0), "tech", 2e9),
            ("C", Some(10.0), "banks", 3e9),
            ("D", Some(20.0), "banks", 4e9),
        ]);
        let rows =
            neutralize_cross_section(&records, &industries, &caps, 2, None).unwrap();

        let res = |i: usize| rows[i].neutralized.unwrap().industry_residual;
        assert_relative_eq!(res(0) + res(1), 0.0, epsilon = 1e-10);
        assert_relative_eq!(res(2) + res(3), 0.0, epsilon = 1e-10);
        assert_relative_eq!(res(0), -1.0, epsilon = 1e-10);
    }

    #[test]
    fn single_member_industry_residual_is_zero() {
        let (records, industries, caps) = setup(&[
            ("A", Some(5.0), "solo", 1e9),
            ("B", Some(1.0), "pair", 2e9),
            ("C", Some(3.0), "pair", 3e9),
        ]);
        let rows =
            neutralize_cross_section(&records, &industries, &caps, 1, None).unwrap();
        assert_relative_eq!(rows[0].neutralized.unwrap().industry_residual, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn size_adjusted_mean_zero_per_size_bucket() {
        // Four stocks, one industry, two size buckets of two.
        let (records, industries, caps) = setup(&[
            ("A", Some(1.0), "tech", 1e9),
            ("B", Some(2.0), "tech", 2e9),
            ("C", Some(7.0), "tech", 8e9),
            ("D", Some(9.0), "tech", 9e9),
        ]);
        let rows =
            neutralize_cross_section(&records, &industries, &caps, 2, None).unwrap();

        let adj = |i: usize| rows[i].neutralized.unwrap().size_adjusted;
        // Small-cap bucket: A, B; large-cap bucket: C, D.
        assert_relative_eq!(adj(0) + adj(1), 0.0, epsilon = 1e-10);
        assert_relative_eq!(adj(2) + adj(3), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn standardized_mean_zero_std_one() {
        let (records, industries, caps) = setup(&[
            ("A", Some(1.0), "tech", 1e9),
            ("B", Some(2.0), "tech", 2e9),
            ("C", Some(4.0), "banks", 3e9),
            ("D", Some(9.0), "banks", 4e9),
        ]);
        let rows =
            neutralize_cross_section(&records, &industries, &caps, 2, None).unwrap();
        let z: Vec<f64> = rows.iter().map(|r| r.neutralized.unwrap().standardized).collect();
        let mean = z.iter().sum::<f64>() / z.len() as f64;
        let var = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (z.len() as f64 - 1.0);
        assert_relative_eq!(mean, 0.0, epsilon = 1e-10);
        assert_relative_eq!(var.sqrt(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn zero_variance_standardizes_to_zeros() {
        // Identical values in one industry and one size bucket: all
        // residuals are zero, so the z-score denominator is zero.
        let (records, industries, caps) = setup(&[
            ("A", Some(5.0), "tech", 1e9),
            ("B", Some(5.0), "tech", 2e9),
            ("C", Some(5.0), "tech", 3e9),
        ]);
        let rows =
            neutralize_cross_section(&records, &industries, &caps, 1, None).unwrap();
        for row in &rows {
            assert_relative_eq!(row.neutralized.unwrap().standardized, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn degenerate_records_pass_through_and_shrink_the_mean() {
        // The degenerate stock is excluded from its industry's mean: the
        // remaining pair must demean to zero between themselves.
        let (records, industries, caps) = setup(&[
            ("A", None, "tech", 1e9),
            ("B", Some(2.0), "tech", 2e9),
            ("C", Some(6.0), "tech", 3e9),
        ]);
        let rows =
            neutralize_cross_section(&records, &industries, &caps, 1, None).unwrap();
        assert_eq!(rows[0].neutralized, None);
        assert_eq!(rows[0].raw, None);
        assert_relative_eq!(rows[1].neutralized.unwrap().industry_residual, -2.0, epsilon = 1e-10);
        assert_relative_eq!(rows[2].neutralized.unwrap().industry_residual, 2.0, epsilon = 1e-10);
    }

    #[test]
    fn missing_market_cap_is_excluded() {
        let (records, industries, mut caps) = setup(&[
            ("A", Some(1.0), "tech", 1e9),
            ("B", Some(2.0), "tech", 2e9),
            ("C", Some(3.0), "tech", 3e9),
        ]);
        caps.remove(&StockId::new("C"));
        let rows =
            neutralize_cross_section(&records, &industries, &caps, 1, None).unwrap();
        assert_eq!(rows[2].neutralized, None);
        // C's raw value is kept, but it no longer moves the industry mean.
        assert_eq!(rows[2].raw, Some(3.0));
        assert_relative_eq!(rows[0].neutralized.unwrap().industry_residual, -0.5, epsilon = 1e-10);
    }

    #[test]
    fn unclassified_stocks_share_a_group() {
        let (records, mut industries, caps) = setup(&[
            ("A", Some(1.0), "tech", 1e9),
            ("B", Some(3.0), "tech", 2e9),
            ("C", Some(10.0), "x", 3e9),
            ("D", Some(20.0), "x", 4e9),
        ]);
        industries.remove(&StockId::new("C"));
        industries.remove(&StockId::new("D"));
        let rows =
            neutralize_cross_section(&records, &industries, &caps, 1, None).unwrap();
        let res = |i: usize| rows[i].neutralized.unwrap().industry_residual;
        assert_relative_eq!(res(2) + res(3), 0.0, epsilon = 1e-10);
        assert_relative_eq!(res(2), -5.0, epsilon = 1e-10);
    }

    #[test]
    fn sigma_clip_tames_outlier_before_standardization() {
        let mut raws: Vec<(String, Option<f64>, &str, f64)> = (0..20)
            .map(|i| (format!("S{i:02}"), Some(f64::from(i)), "tech", 1e9 + f64::from(i)))
            .collect();
        raws.push(("S99".to_string(), Some(1000.0), "tech", 2e9));

        let records: Vec<FactorRecord> =
            raws.iter().map(|(id, raw, _, _)| record(id, *raw)).collect();
        let industries: BTreeMap<StockId, IndustryId> = raws
            .iter()
            .map(|(id, _, ind, _)| (StockId::new(id.clone()), IndustryId::new(*ind)))
            .collect();
        let caps: BTreeMap<StockId, f64> =
            raws.iter().map(|(id, _, _, cap)| (StockId::new(id.clone()), *cap)).collect();

        let clipped =
            neutralize_cross_section(&records, &industries, &caps, 1, Some(2.0)).unwrap();
        let unclipped =
            neutralize_cross_section(&records, &industries, &caps, 1, None).unwrap();
        let z_clipped = clipped.last().unwrap().neutralized.unwrap().standardized;
        let z_unclipped = unclipped.last().unwrap().neutralized.unwrap().standardized;
        assert!(z_clipped < z_unclipped);
    }
}
