// Score normalization shared by the ranking methods.

/// Divide every value by the maximum so the league best is 1.0.
///
/// Left unchanged when the maximum is not positive (all zero, empty), since
/// there is no meaningful scale to apply.
pub fn normalize_by_max(values: &mut [f64]) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() && max > 0.0 {
        for v in values.iter_mut() {
            *v /= max;
        }
    }
}

/// Divide every value by the mean. Returns `None` when the mean is zero or
/// not finite.
pub fn normalize_by_mean(values: &mut [f64]) -> Option<()> {
    if values.is_empty() {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if !mean.is_finite() || mean.abs() < f64::EPSILON {
        return None;
    }
    for v in values.iter_mut() {
        *v /= mean;
    }
    Some(())
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_normalized_peak_is_one() {
        let mut v = vec![2.0, 4.0, 1.0];
        normalize_by_max(&mut v);
        assert_eq!(v, vec![0.5, 1.0, 0.25]);
    }

    #[test]
    fn max_normalize_leaves_all_zero_alone() {
        let mut v = vec![0.0, 0.0];
        normalize_by_max(&mut v);
        assert_eq!(v, vec![0.0, 0.0]);
    }

    #[test]
    fn mean_normalized_average_is_one() {
        let mut v = vec![1.0, 2.0, 3.0];
        normalize_by_mean(&mut v).unwrap();
        assert!((mean(&v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mean_normalize_rejects_zero_mean() {
        let mut v = vec![0.0, 0.0, 0.0];
        assert!(normalize_by_mean(&mut v).is_none());
    }
}
