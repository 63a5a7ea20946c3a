//! Statistical utility functions.

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Calculate the standard deviation of a slice.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Mean of the non-NaN values, `NaN` if there are none.
pub fn nan_mean(values: &[f64]) -> f64 {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    mean(&valid)
}

/// Fill `NaN` gaps by linear interpolation between the nearest valid values.
///
/// Leading and trailing gaps take the nearest valid value. Returns `None` if
/// there is no valid value at all.
pub fn interpolate_gaps(values: &[f64]) -> Option<Vec<f64>> {
    let valid: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_nan()).collect();
    let (&first, &last) = (valid.first()?, valid.last()?);

    let mut filled = values.to_vec();
    for i in 0..first {
        filled[i] = values[first];
    }
    for i in last + 1..values.len() {
        filled[i] = values[last];
    }
    for pair in valid.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let span = (b - a) as f64;
        for i in a + 1..b {
            let w = (i - a) as f64 / span;
            filled[i] = values[a] * (1.0 - w) + values[b] * w;
        }
    }
    Some(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_calculates_correctly() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert_relative_eq!(mean(&[10.0]), 10.0, epsilon = 1e-10);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn variance_calculates_correctly() {
        // Sample variance of [1, 2, 3, 4, 5] = 2.5
        assert_relative_eq!(variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5, epsilon = 1e-10);
        assert!(variance(&[1.0]).is_nan());
        assert!(variance(&[]).is_nan());
    }

    #[test]
    fn std_dev_calculates_correctly() {
        assert_relative_eq!(
            std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            2.5_f64.sqrt(),
            epsilon = 1e-10
        );
        assert_relative_eq!(std_dev(&[10.0, 10.0, 10.0, 10.0]), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_mean_skips_missing() {
        assert_relative_eq!(nan_mean(&[1.0, f64::NAN, 3.0]), 2.0, epsilon = 1e-12);
        assert!(nan_mean(&[f64::NAN]).is_nan());
    }

    #[test]
    fn interpolate_inner_and_edge_gaps() {
        let filled = interpolate_gaps(&[f64::NAN, 1.0, f64::NAN, f64::NAN, 4.0, f64::NAN]).unwrap();
        for (got, want) in filled.iter().zip([1.0, 1.0, 2.0, 3.0, 4.0, 4.0]) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
        assert!(interpolate_gaps(&[f64::NAN, f64::NAN]).is_none());
        assert!(interpolate_gaps(&[]).is_none());
    }
}
