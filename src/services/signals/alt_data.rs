//! Alternative data signal: news, derivatives positioning, on-chain, macro.

use crate::error::{Result, SignalError};
use crate::services::signals::indicators::blend_alt_data;
use crate::services::signals::{make_signal_result, required, Signal, SignalSettings};
use crate::types::{PayloadField, SignalKind, SignalPayload, SignalResult};
use serde_json::json;

const THRESHOLD: f64 = 15.0;
const MAX_CONFIDENCE: f64 = 90.0;
const AGREEMENT_BONUS: f64 = 15.0;

const REQUIRED: &[PayloadField] = &[PayloadField::AltData];

/// Blends news, derivatives positioning, on-chain flow and macro risk
/// appetite into one score, trusted more as more sources agree.
pub struct AltDataSignal {
    settings: SignalSettings,
}

impl Default for AltDataSignal {
    fn default() -> Self {
        Self::new(SignalSettings::for_kind(SignalKind::AltData))
    }
}

impl AltDataSignal {
    pub fn new(settings: SignalSettings) -> Self {
        Self { settings }
    }
}

/// Confidence from how many independent sources are present.
fn coverage_confidence(components: usize) -> f64 {
    match components {
        0 => 0.0,
        1 => 35.0,
        2 => 50.0,
        3 => 65.0,
        _ => 75.0,
    }
}

impl Signal for AltDataSignal {
    fn name(&self) -> &str {
        SignalKind::AltData.name()
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
        let bundle = required(payload.alt_data.as_ref(), PayloadField::AltData)?;
        let composite = blend_alt_data(bundle).ok_or_else(|| {
            SignalError::InsufficientData("alternative data bundle is empty".to_string())
        })?;

        let mut confidence = coverage_confidence(composite.components.len());
        let agree = composite.components_agree();
        if agree {
            confidence += AGREEMENT_BONUS;
        }

        let parts: Vec<String> = composite
            .components
            .iter()
            .map(|c| format!("{} {:+.0}", c.name, c.score))
            .collect();
        let rationale = format!(
            "Blended alternative data {:+.1} from {}{}",
            composite.score,
            parts.join(", "),
            if agree { ", all sources agree" } else { "" }
        );

        let components: serde_json::Map<String, serde_json::Value> = composite
            .components
            .iter()
            .map(|c| (c.name.to_string(), json!({ "score": c.score, "weight": c.weight })))
            .collect();

        Ok(make_signal_result(
            self.name(),
            composite.score,
            self.adjusted_confidence(confidence.min(MAX_CONFIDENCE)),
            THRESHOLD,
            rationale,
        )?
        .with_detail("components", components)
        .with_detail("sources_agree", agree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AltDataBundle, DerivativesPositioning, Direction, NewsSentiment};

    #[test]
    fn test_agreeing_sources_are_bullish() {
        let payload = SignalPayload::new().with_alt_data(AltDataBundle {
            news: Some(NewsSentiment {
                score: 0.8,
                article_count: 10,
            }),
            macro_score: Some(0.5),
            ..Default::default()
        });
        let result = AltDataSignal::default().calculate(&payload).unwrap();
        // (80 * 0.35 + 50 * 0.15) / 0.5
        assert!((result.score - 71.0).abs() < 1e-9);
        assert_eq!(result.direction, Direction::Bullish);
        assert_eq!(result.confidence, 65.0);
    }

    #[test]
    fn test_crowded_longs_are_bearish() {
        let payload = SignalPayload::new().with_alt_data(AltDataBundle {
            derivatives: Some(DerivativesPositioning {
                funding_rate: 0.002,
                long_short_ratio: 2.5,
                open_interest_change_pct: 15.0,
            }),
            ..Default::default()
        });
        let result = AltDataSignal::default().calculate(&payload).unwrap();
        assert_eq!(result.direction, Direction::Bearish);
        assert_eq!(result.confidence, 35.0);
    }

    #[test]
    fn test_empty_bundle_is_insufficient() {
        let payload = SignalPayload::new().with_alt_data(AltDataBundle::default());
        let err = AltDataSignal::default().calculate(&payload).unwrap_err();
        assert!(matches!(err, SignalError::InsufficientData(_)));
    }
}
