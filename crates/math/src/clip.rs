//! Sigma clipping for outlier handling.

use ndarray::Array1;

use crate::{MathError, sample_std};

/// Clip a cross-section to `mean ± n_sigma` standard deviations.
///
/// NaN values pass through unchanged. A zero-variance cross-section is
/// returned as-is.
///
/// # Arguments
/// * `data` - Input array
/// * `n_sigma` - Clip threshold in sigmas (e.g. 3.0)
///
/// # Errors
/// Returns `MathError::InvalidSigma` if `n_sigma` is not positive.
pub fn sigma_clip(data: &Array1<f64>, n_sigma: f64) -> Result<Array1<f64>, MathError> {
    if n_sigma <= 0.0 {
        return Err(MathError::InvalidSigma(n_sigma));
    }
    if data.is_empty() {
        return Ok(data.clone());
    }

    let mean = data.mean().unwrap_or(0.0);
    let std = sample_std(data);
    if std == 0.0 {
        return Ok(data.clone());
    }

    let lower = mean - n_sigma * std;
    let upper = mean + n_sigma * std;
    Ok(data.mapv(|x| if x.is_nan() { x } else { x.clamp(lower, upper) }))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[test]
    fn clips_extremes() {
        let data = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0];
        let result = sigma_clip(&data, 2.0).unwrap();
        assert!(result[9] < 100.0);
        assert_relative_eq!(result[4], 5.0, epsilon = 1e-10);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    fn invalid_sigma_errors(#[case] sigma: f64) {
        let data = array![1.0, 2.0, 3.0];
        assert!(sigma_clip(&data, sigma).is_err());
    }

    #[test]
    fn zero_variance_untouched() {
        let data = array![2.0, 2.0, 2.0];
        let result = sigma_clip(&data, 3.0).unwrap();
        assert_relative_eq!(result[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_passes_through() {
        let data = array![1.0, f64::NAN, 3.0, 4.0];
        let result = sigma_clip(&data, 3.0).unwrap();
        assert!(result[1].is_nan());
    }

    #[test]
    fn empty_array() {
        let data: Array1<f64> = array![];
        assert!(sigma_clip(&data, 3.0).unwrap().is_empty());
    }
}
