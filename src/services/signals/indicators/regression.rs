//! Ordinary least squares trend quality.

/// Linear fit of values against their index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFit {
    /// Change per step, in the units of the input.
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, clamped to [0, 1].
    pub r_squared: f64,
}

impl TrendFit {
    fn flat(intercept: f64) -> Self {
        Self {
            slope: 0.0,
            intercept,
            r_squared: 0.0,
        }
    }
}

/// Fit `y = intercept + slope * x` with `x = 0, 1, 2, ...`.
///
/// Zero variance in `x` (fewer than two points) gives slope 0 and R² 0, as
/// does a perfectly flat series.
pub fn linear_trend(values: &[f64]) -> TrendFit {
    let n = values.len();
    if n == 0 {
        return TrendFit::flat(0.0);
    }

    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n_f;

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        ss_xx += dx * dx;
        ss_xy += dx * (y - mean_y);
    }

    if ss_xx == 0.0 {
        return TrendFit::flat(mean_y);
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let (ss_res, ss_tot) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(res, tot), (i, y)| {
            let fitted = intercept + slope * i as f64;
            (res + (y - fitted).powi(2), tot + (y - mean_y).powi(2))
        });

    let r_squared = if ss_tot > 0.0 {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    } else {
        0.0
    };

    TrendFit {
        slope,
        intercept,
        r_squared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_line() {
        let values: Vec<f64> = (0..10).map(|i| 5.0 + 2.0 * i as f64).collect();
        let fit = linear_trend(&values);
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 5.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_point_has_no_trend() {
        let fit = linear_trend(&[42.0]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
        assert_eq!(fit.intercept, 42.0);
    }

    #[test]
    fn test_flat_series() {
        let fit = linear_trend(&[3.0; 8]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn test_noisy_series_partial_fit() {
        let values = [1.0, 3.0, 2.0, 4.0, 3.0, 5.0, 4.0, 6.0];
        let fit = linear_trend(&values);
        assert!(fit.slope > 0.0);
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);
    }
}
