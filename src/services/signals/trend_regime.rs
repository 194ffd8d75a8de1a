//! Trend regime signal: ADX direction, band-width regime, regression quality.

use crate::error::{Result, SignalError};
use crate::services::signals::indicators::adx::min_candles;
use crate::services::signals::indicators::{adx, band_width, linear_trend};
use crate::services::signals::{make_signal_result, required, Signal, SignalSettings};
use crate::types::{closes, PayloadField, SignalKind, SignalPayload, SignalResult};

const THRESHOLD: f64 = 15.0;
const MAX_CONFIDENCE: f64 = 90.0;
const ADX_PERIOD: usize = 14;
const BAND_WINDOW: usize = 20;
const BAND_K: f64 = 2.0;
const REGRESSION_WINDOW: usize = 20;
/// Slope (percent per bar) that counts as a full-strength trend.
const FULL_SLOPE_PCT: f64 = 0.2;
const ADX_WEIGHT: f64 = 0.6;
const REGRESSION_WEIGHT: f64 = 0.4;
const EPSILON: f64 = 1e-10;

const REQUIRED: &[PayloadField] = &[PayloadField::PriceHistory];

/// Trend direction weighted by how much of a trend there actually is.
pub struct TrendRegimeSignal {
    settings: SignalSettings,
}

impl Default for TrendRegimeSignal {
    fn default() -> Self {
        Self::new(SignalSettings::for_kind(SignalKind::TrendRegime))
    }
}

impl TrendRegimeSignal {
    pub fn new(settings: SignalSettings) -> Self {
        Self { settings }
    }
}

/// Share of the DI spread that counts at a given ADX.
fn trend_strength(adx: f64) -> f64 {
    if adx < 20.0 {
        0.3
    } else if adx < 25.0 {
        0.6
    } else if adx < 40.0 {
        0.85
    } else {
        1.0
    }
}

fn base_confidence(adx: f64) -> f64 {
    if adx < 20.0 {
        30.0
    } else if adx < 25.0 {
        45.0
    } else if adx < 40.0 {
        60.0
    } else {
        70.0
    }
}

fn regime_label(adx: f64) -> &'static str {
    if adx < 20.0 {
        "ranging"
    } else if adx < 40.0 {
        "trending"
    } else {
        "strongly trending"
    }
}

impl Signal for TrendRegimeSignal {
    fn name(&self) -> &str {
        SignalKind::TrendRegime.name()
    }

    fn weight(&self) -> f64 {
        self.settings.weight
    }

    fn historical_accuracy(&self) -> Option<f64> {
        self.settings.historical_accuracy
    }

    fn required_data(&self) -> &'static [PayloadField] {
        REQUIRED
    }

    fn calculate(&self, payload: &SignalPayload) -> Result<SignalResult> {
        let candles = required(payload.price_history.as_deref(), PayloadField::PriceHistory)?;
        let needed = min_candles(ADX_PERIOD);
        if candles.len() < needed {
            return Err(SignalError::InsufficientData(format!(
                "need {} candles for ADX({}), got {}",
                needed,
                ADX_PERIOD,
                candles.len()
            )));
        }

        let reading = adx(candles, ADX_PERIOD).ok_or_else(|| {
            SignalError::InsufficientData("ADX could not be computed".to_string())
        })?;

        let prices = closes(candles);
        let bands = band_width(&prices, BAND_WINDOW, BAND_K);

        let recent = &prices[prices.len().saturating_sub(REGRESSION_WINDOW)..];
        let fit = linear_trend(recent);
        let mean_price = recent.iter().sum::<f64>() / recent.len() as f64;
        let slope_pct = if mean_price > 0.0 {
            fit.slope / mean_price * 100.0
        } else {
            0.0
        };

        let di_spread =
            (reading.plus_di - reading.minus_di) / (reading.plus_di + reading.minus_di + EPSILON);
        let adx_score = di_spread * 100.0 * trend_strength(reading.adx);
        let slope_sign = if fit.slope > 0.0 {
            1.0
        } else if fit.slope < 0.0 {
            -1.0
        } else {
            0.0
        };
        let reg_score =
            slope_sign * fit.r_squared * (slope_pct.abs() / FULL_SLOPE_PCT).min(1.0) * 100.0;
        let score = ADX_WEIGHT * adx_score + REGRESSION_WEIGHT * reg_score;

        let mut confidence = base_confidence(reading.adx) + 15.0 * fit.r_squared;
        if adx_score != 0.0 && reg_score != 0.0 && adx_score.signum() == reg_score.signum() {
            confidence += 5.0;
        }
        if bands.percentile > 70.0 {
            confidence += 5.0;
        } else if bands.percentile < 20.0 {
            confidence -= 10.0;
        }
        let confidence = confidence.clamp(0.0, MAX_CONFIDENCE);

        let rationale = format!(
            "ADX {:.1} ({}), +DI {:.1} vs -DI {:.1}; {}-bar slope {:+.3}%/bar with R² {:.2}; band width at {:.0}th percentile",
            reading.adx,
            regime_label(reading.adx),
            reading.plus_di,
            reading.minus_di,
            recent.len(),
            slope_pct,
            fit.r_squared,
            bands.percentile
        );

        Ok(make_signal_result(
            self.name(),
            score,
            self.adjusted_confidence(confidence),
            THRESHOLD,
            rationale,
        )?
        .with_detail("adx", reading.adx)
        .with_detail("plus_di", reading.plus_di)
        .with_detail("minus_di", reading.minus_di)
        .with_detail("adx_score", adx_score)
        .with_detail("slope_pct", slope_pct)
        .with_detail("r_squared", fit.r_squared)
        .with_detail("regression_score", reg_score)
        .with_detail("band_width", bands.width)
        .with_detail("band_width_percentile", bands.percentile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, OhlcPoint};

    fn trend(count: usize, step: f64) -> Vec<OhlcPoint> {
        (0..count)
            .map(|i| {
                let close = 200.0 + i as f64 * step;
                OhlcPoint {
                    time: i as i64 * 86_400_000,
                    open: close - step / 2.0,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: Some(1_000.0),
                }
            })
            .collect()
    }

    #[test]
    fn test_uptrend_is_bullish() {
        let payload = SignalPayload::new().with_price_history(trend(60, 1.0));
        let result = TrendRegimeSignal::default().calculate(&payload).unwrap();
        assert_eq!(result.direction, Direction::Bullish);
        assert!(result.score > 50.0);
        assert!(result.confidence <= MAX_CONFIDENCE);
        assert!(result.details["adx"].as_f64().unwrap() > 40.0);
    }

    #[test]
    fn test_downtrend_is_bearish() {
        let payload = SignalPayload::new().with_price_history(trend(60, -1.0));
        let result = TrendRegimeSignal::default().calculate(&payload).unwrap();
        assert_eq!(result.direction, Direction::Bearish);
        assert!(result.score < -50.0);
    }

    #[test]
    fn test_flat_market_is_neutral() {
        let payload = SignalPayload::new().with_price_history(trend(40, 0.0));
        let result = TrendRegimeSignal::default().calculate(&payload).unwrap();
        assert_eq!(result.direction, Direction::Neutral);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_short_history_is_insufficient() {
        let payload = SignalPayload::new().with_price_history(trend(28, 1.0));
        let err = TrendRegimeSignal::default().calculate(&payload).unwrap_err();
        assert!(matches!(err, SignalError::InsufficientData(_)));
    }

    #[test]
    fn test_strength_ladder() {
        assert_eq!(trend_strength(10.0), 0.3);
        assert_eq!(trend_strength(20.0), 0.6);
        assert_eq!(trend_strength(25.0), 0.85);
        assert_eq!(trend_strength(40.0), 1.0);
    }
}
