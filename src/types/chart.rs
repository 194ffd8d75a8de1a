use serde::{Deserialize, Serialize};

/// OHLCV (Open, High, Low, Close, Volume) data point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcPoint {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl OhlcPoint {
    /// Typical price: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Traded volume, treating missing or non-finite values as zero.
    pub fn volume_or_zero(&self) -> f64 {
        match self.volume {
            Some(v) if v.is_finite() && v > 0.0 => v,
            _ => 0.0,
        }
    }
}

/// Extract closing prices from a candle series.
pub fn closes(candles: &[OhlcPoint]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(high: f64, low: f64, close: f64, volume: Option<f64>) -> OhlcPoint {
        OhlcPoint {
            time: 0,
            open: close,
            high,
            low,
            close,
            volume,
        }
    }

    #[test]
    fn test_typical_price() {
        let c = candle(12.0, 6.0, 9.0, None);
        assert!((c.typical_price() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_volume_or_zero() {
        assert_eq!(candle(1.0, 1.0, 1.0, None).volume_or_zero(), 0.0);
        assert_eq!(candle(1.0, 1.0, 1.0, Some(f64::NAN)).volume_or_zero(), 0.0);
        assert_eq!(candle(1.0, 1.0, 1.0, Some(-5.0)).volume_or_zero(), 0.0);
        assert_eq!(candle(1.0, 1.0, 1.0, Some(250.0)).volume_or_zero(), 250.0);
    }

    #[test]
    fn test_volume_deserializes_when_absent() {
        let json = r#"{"time":1,"open":1.0,"high":2.0,"low":0.5,"close":1.5}"#;
        let c: OhlcPoint = serde_json::from_str(json).unwrap();
        assert!(c.volume.is_none());
    }
}
