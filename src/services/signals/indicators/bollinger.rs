//! Bollinger band width and its historical percentile.

/// Band width reading.
///
/// - Width: `k * stddev / SMA`, i.e. band half-width relative to price
/// - Percentile: share (0-100) of all rolling widths strictly below the
///   current one. Low percentile = squeeze, high = expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandWidth {
    pub width: f64,
    pub percentile: f64,
}

impl BandWidth {
    /// Reading used when there is not enough history.
    pub fn uncertain() -> Self {
        Self {
            width: 0.0,
            percentile: 50.0,
        }
    }
}

/// Calculate standard deviation.
fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance: f64 =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Rolling band widths, one per complete window, oldest first.
pub fn rolling_widths(closes: &[f64], window: usize, k: f64) -> Vec<f64> {
    if window == 0 || closes.len() < window {
        return Vec::new();
    }

    closes
        .windows(window)
        .map(|w| {
            let middle = w.iter().sum::<f64>() / window as f64;
            if middle.abs() < f64::EPSILON {
                0.0
            } else {
                k * std_dev(w, middle) / middle.abs()
            }
        })
        .collect()
}

/// Current band width and its percentile over the full history.
///
/// With fewer than `window` closes, returns width 0 and percentile 50.
pub fn band_width(closes: &[f64], window: usize, k: f64) -> BandWidth {
    let widths = rolling_widths(closes, window, k);
    let Some(&current) = widths.last() else {
        return BandWidth::uncertain();
    };

    let below = widths.iter().filter(|w| **w < current).count();
    BandWidth {
        width: current,
        percentile: below as f64 / widths.len() as f64 * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_history() {
        let reading = band_width(&[1.0; 10], 20, 2.0);
        assert_eq!(reading, BandWidth::uncertain());
    }

    #[test]
    fn test_flat_prices_have_zero_width() {
        let reading = band_width(&[100.0; 30], 20, 2.0);
        assert_eq!(reading.width, 0.0);
        assert_eq!(reading.percentile, 0.0);
    }

    #[test]
    fn test_width_formula() {
        // Alternating 99/101: mean 100, population stddev 1
        let closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 99.0 } else { 101.0 })
            .collect();
        let reading = band_width(&closes, 20, 2.0);
        assert!((reading.width - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_expansion_ranks_high() {
        // Quiet tape followed by a volatile tail
        let mut closes: Vec<f64> = (0..40).map(|i| 100.0 + (i % 2) as f64 * 0.1).collect();
        closes.extend((0..10).map(|i| if i % 2 == 0 { 92.0 } else { 108.0 }));
        let reading = band_width(&closes, 20, 2.0);
        assert!(reading.percentile > 80.0, "got {}", reading.percentile);
    }
}
