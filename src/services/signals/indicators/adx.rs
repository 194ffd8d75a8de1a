//! Average Directional Index (ADX) and directional indicators.

use crate::types::OhlcPoint;

/// Guard against divide-by-zero in DI and DX ratios.
const EPSILON: f64 = 1e-10;

/// ADX reading at the latest candle.
///
/// - ADX below 20: weak trend / ranging market
/// - 20-40: trending
/// - above 40: strong trend
///
/// +DI above -DI means the trend points up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxReading {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Minimum number of candles needed for an ADX of the given period.
pub fn min_candles(period: usize) -> usize {
    period * 2 + 1
}

/// Calculate True Range.
fn true_range(current: &OhlcPoint, previous: &OhlcPoint) -> f64 {
    let hl = current.high - current.low;
    let hc = (current.high - previous.close).abs();
    let lc = (current.low - previous.close).abs();
    hl.max(hc).max(lc)
}

/// Wilder's smoothing.
///
/// Seeded by the simple mean of the first `period` values, then
/// `S[i] = (S[i-1] * (period - 1) + x[i]) / period`.
pub fn wilders_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);
    let mut current: f64 = values.iter().take(period).sum::<f64>() / period as f64;
    result.push(current);

    for value in values.iter().skip(period) {
        current = (current * (period - 1) as f64 + value) / period as f64;
        result.push(current);
    }

    result
}

/// Calculate ADX, +DI and -DI over a candle series.
///
/// Returns `None` with fewer than `2 * period + 1` candles.
pub fn adx(candles: &[OhlcPoint], period: usize) -> Option<AdxReading> {
    if period == 0 || candles.len() < min_candles(period) {
        return None;
    }

    let mut plus_dm = Vec::with_capacity(candles.len() - 1);
    let mut minus_dm = Vec::with_capacity(candles.len() - 1);
    let mut tr = Vec::with_capacity(candles.len() - 1);

    for pair in candles.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);

        let up_move = current.high - previous.high;
        let down_move = previous.low - current.low;

        plus_dm.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dm.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });
        tr.push(true_range(current, previous));
    }

    let smoothed_plus_dm = wilders_smooth(&plus_dm, period);
    let smoothed_minus_dm = wilders_smooth(&minus_dm, period);
    let smoothed_tr = wilders_smooth(&tr, period);

    let dx_values: Vec<f64> = smoothed_tr
        .iter()
        .zip(smoothed_plus_dm.iter().zip(smoothed_minus_dm.iter()))
        .map(|(atr, (pdm, mdm))| {
            let plus_di = 100.0 * pdm / (atr + EPSILON);
            let minus_di = 100.0 * mdm / (atr + EPSILON);
            100.0 * (plus_di - minus_di).abs() / (plus_di + minus_di + EPSILON)
        })
        .collect();

    let adx = *wilders_smooth(&dx_values, period).last()?;

    let last_atr = *smoothed_tr.last()?;
    let plus_di = 100.0 * smoothed_plus_dm.last()? / (last_atr + EPSILON);
    let minus_di = 100.0 * smoothed_minus_dm.last()? / (last_atr + EPSILON);

    Some(AdxReading {
        adx,
        plus_di,
        minus_di,
    })
}
