use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Directional bias of a signal or aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

impl Direction {
    /// Classify a score against a symmetric threshold.
    ///
    /// `score > threshold` is bullish, `score < -threshold` is bearish,
    /// anything in between (inclusive) is neutral.
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score > threshold {
            Direction::Bullish
        } else if score < -threshold {
            Direction::Bearish
        } else {
            Direction::Neutral
        }
    }

    /// Get display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Bullish => "Bullish",
            Direction::Bearish => "Bearish",
            Direction::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The concrete signals that can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Put/call implied-volatility skew around the money.
    OptionsSkew,
    /// Trade aggression and block prints in the options tape.
    OrderFlow,
    /// Call/put volume relative to its own history.
    UnusualVolume,
    /// ADX, band-width and regression trend regime.
    TrendRegime,
    /// Price location versus the traded-volume value area.
    VolumeProfile,
    /// News, derivatives positioning, on-chain and macro blend.
    AltData,
}

impl SignalKind {
    /// All kinds in canonical evaluation order.
    pub const ALL: [SignalKind; 6] = [
        SignalKind::OptionsSkew,
        SignalKind::OrderFlow,
        SignalKind::UnusualVolume,
        SignalKind::TrendRegime,
        SignalKind::VolumeProfile,
        SignalKind::AltData,
    ];

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "options_skew" | "skew" | "iv_skew" => Some(Self::OptionsSkew),
            "order_flow" | "flow" => Some(Self::OrderFlow),
            "unusual_volume" | "unusual_activity" | "volume" => Some(Self::UnusualVolume),
            "trend_regime" | "trend" | "regime" => Some(Self::TrendRegime),
            "volume_profile" | "profile" => Some(Self::VolumeProfile),
            "alt_data" | "alternative" | "alt" => Some(Self::AltData),
            _ => None,
        }
    }

    /// Snake-case key used in configuration.
    pub fn key(&self) -> &'static str {
        match self {
            Self::OptionsSkew => "options_skew",
            Self::OrderFlow => "order_flow",
            Self::UnusualVolume => "unusual_volume",
            Self::TrendRegime => "trend_regime",
            Self::VolumeProfile => "volume_profile",
            Self::AltData => "alt_data",
        }
    }

    /// Display name, also used as `signal_name` on results.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OptionsSkew => "Options Skew",
            Self::OrderFlow => "Order Flow",
            Self::UnusualVolume => "Unusual Volume",
            Self::TrendRegime => "Trend Regime",
            Self::VolumeProfile => "Volume Profile",
            Self::AltData => "Alternative Data",
        }
    }

    /// Default weight. The defaults sum to 1.0.
    pub fn default_weight(&self) -> f64 {
        match self {
            Self::OptionsSkew => 0.25,
            Self::OrderFlow => 0.20,
            Self::UnusualVolume => 0.15,
            Self::TrendRegime => 0.15,
            Self::VolumeProfile => 0.10,
            Self::AltData => 0.15,
        }
    }
}

/// One signal's verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalResult {
    pub signal_name: String,
    pub direction: Direction,
    /// Score from -100 (strongly bearish) to +100 (strongly bullish).
    pub score: f64,
    /// Confidence from 0 (ignore) to 100.
    pub confidence: f64,
    pub rationale: String,
    /// Diagnostic sub-metrics. Never read by the aggregator's math.
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
    /// Unix timestamp (milliseconds) when calculated.
    pub timestamp: i64,
}

impl SignalResult {
    /// Create a result, clamping score and confidence into range.
    pub fn new(
        signal_name: impl Into<String>,
        direction: Direction,
        score: f64,
        confidence: f64,
        rationale: impl Into<String>,
    ) -> Self {
        let rationale = rationale.into();
        Self {
            signal_name: signal_name.into(),
            direction,
            score: clamp_or_zero(score, -100.0, 100.0),
            confidence: clamp_or_zero(confidence, 0.0, 100.0),
            rationale: if rationale.trim().is_empty() {
                "No rationale provided".to_string()
            } else {
                rationale
            },
            details: BTreeMap::new(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Neutral, zero-confidence result explaining why nothing was computed.
    pub fn neutral(signal_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(signal_name, Direction::Neutral, 0.0, 0.0, reason)
    }

    /// Add a diagnostic detail.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// The aggregate verdict for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionalScore {
    pub symbol: String,
    pub direction: Direction,
    /// Weighted score from -100 to +100.
    pub score: f64,
    /// Aggregate confidence from 0 to 95.
    pub confidence: f64,
    /// One result per configured signal, in configuration order.
    pub signals: Vec<SignalResult>,
    pub recommendation: String,
    /// Unix timestamp (milliseconds) when computed.
    pub timestamp: i64,
}

/// Confidence strength tier for recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence < 45.0 {
            ConfidenceTier::VeryWeak
        } else if confidence < 60.0 {
            ConfidenceTier::Weak
        } else if confidence < 75.0 {
            ConfidenceTier::Moderate
        } else {
            ConfidenceTier::Strong
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::VeryWeak => "Very Weak",
            ConfidenceTier::Weak => "Weak",
            ConfidenceTier::Moderate => "Moderate",
            ConfidenceTier::Strong => "Strong",
        }
    }
}

/// One signal's line in a breakdown report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalContribution {
    pub name: String,
    pub direction: Direction,
    pub score: f64,
    pub confidence: f64,
    pub weight: f64,
    /// score * weight * confidence / 100
    pub weighted_contribution: f64,
    pub rationale: String,
}

/// Transparency report derived from a [`DirectionalScore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalBreakdown {
    pub symbol: String,
    pub direction: Direction,
    pub score: f64,
    pub confidence: f64,
    pub recommendation: String,
    pub signals: Vec<SignalContribution>,
}

fn clamp_or_zero(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_score_thresholds() {
        assert_eq!(Direction::from_score(15.1, 15.0), Direction::Bullish);
        assert_eq!(Direction::from_score(15.0, 15.0), Direction::Neutral);
        assert_eq!(Direction::from_score(-15.0, 15.0), Direction::Neutral);
        assert_eq!(Direction::from_score(-15.1, 15.0), Direction::Bearish);
        assert_eq!(Direction::from_score(18.0, 20.0), Direction::Neutral);
    }

    #[test]
    fn test_result_clamps_values() {
        let r = SignalResult::new("Test", Direction::Bullish, 250.0, 140.0, "strong");
        assert_eq!(r.score, 100.0);
        assert_eq!(r.confidence, 100.0);

        let r = SignalResult::new("Test", Direction::Neutral, f64::NAN, -3.0, "nan");
        assert_eq!(r.score, 0.0);
        assert_eq!(r.confidence, 0.0);
    }

    #[test]
    fn test_result_rationale_never_empty() {
        let r = SignalResult::new("Test", Direction::Neutral, 0.0, 0.0, "  ");
        assert!(!r.rationale.trim().is_empty());
    }

    #[test]
    fn test_neutral_result() {
        let r = SignalResult::neutral("Order Flow", "order flow table is empty");
        assert_eq!(r.direction, Direction::Neutral);
        assert_eq!(r.score, 0.0);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.rationale, "order flow table is empty");
    }

    #[test]
    fn test_confidence_tiers() {
        assert_eq!(ConfidenceTier::from_confidence(44.9), ConfidenceTier::VeryWeak);
        assert_eq!(ConfidenceTier::from_confidence(45.0), ConfidenceTier::Weak);
        assert_eq!(ConfidenceTier::from_confidence(60.0), ConfidenceTier::Moderate);
        assert_eq!(ConfidenceTier::from_confidence(75.0), ConfidenceTier::Strong);
    }

    #[test]
    fn test_signal_kind_round_trip_keys() {
        for kind in SignalKind::ALL {
            assert_eq!(SignalKind::from_str(kind.key()), Some(kind));
        }
        assert_eq!(SignalKind::from_str("Trend-Regime"), Some(SignalKind::TrendRegime));
        assert_eq!(SignalKind::from_str("astrology"), None);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let sum: f64 = SignalKind::ALL.iter().map(|k| k.default_weight()).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
