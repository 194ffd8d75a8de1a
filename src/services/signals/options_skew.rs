//! Options implied-volatility skew signal.

use crate::error::Result;
use crate::services::signals::indicators::{options_skew, SkewMetrics};
use crate::services::signals::{clamp_score, make_signal_result, required, Signal, SignalSettings};
use crate::types::{PayloadField, SignalKind, SignalPayload, SignalResult};

const THRESHOLD: f64 = 15.0;
const MAX_CONFIDENCE: f64 = 90.0;
/// Skew spread that maps to a full-strength score.
const FULL_SPREAD: f64 = 0.30;
/// Risk reversal (IV points) that maps to a full-strength score.
const FULL_RISK_REVERSAL: f64 = 0.15;
const SKEW_WEIGHT: f64 = 0.7;
const RISK_REVERSAL_WEIGHT: f64 = 0.3;

const REQUIRED: &[PayloadField] = &[PayloadField::CurrentPrice, PayloadField::OptionsChain];

/// Reads positioning from the shape of the volatility smile.
///
/// When OTM puts trade rich to OTM calls the market is paying for downside
/// protection (bearish); when calls are bid over puts it is reaching for
/// upside (bullish).
pub struct OptionsSkewSignal {
    settings: SignalSettings,
}

impl Default for OptionsSkewSignal {
    fn default() -> Self {
        Self::new(SignalSettings::for_kind(SignalKind::OptionsSkew))
    }
}

impl OptionsSkewSignal {
    pub fn new(settings: SignalSettings) -> Self {
        Self { settings }
    }

    /// Score and raw confidence for a set of skew statistics.
    fn score(metrics: &SkewMetrics) -> (f64, f64) {
        let skew_score = clamp_score(-metrics.skew_spread / FULL_SPREAD * 100.0);

        let score = match metrics.risk_reversal {
            Some(rr) => {
                let rr_score = clamp_score(-rr / FULL_RISK_REVERSAL * 100.0);
                SKEW_WEIGHT * skew_score + RISK_REVERSAL_WEIGHT * rr_score
            }
            None => skew_score,
        };

        let mut confidence = 40.0 + (metrics.skew_spread.abs() / FULL_SPREAD).min(1.0) * 40.0;
        if metrics.put_count + metrics.call_count >= 6 {
            confidence += 5.0;
        }
        if let Some(rr) = metrics.risk_reversal {
            if rr != 0.0 && rr.signum() == metrics.skew_spread.signum() {
                confidence += 5.0;
            }
        }

        (score, confidence.min(MAX_CONFIDENCE))
    }
}

impl Signal for OptionsSkewSignal {
    fn name(&self) -> &str {
        SignalKind::OptionsSkew.name()
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
        let spot = required(payload.current_price, PayloadField::CurrentPrice)?;
        let chain = required(payload.options_chain.as_deref(), PayloadField::OptionsChain)?;
        let metrics = options_skew(chain, spot, payload.atm_iv)?;

        let (score, confidence) = Self::score(&metrics);

        let reading = if metrics.skew_spread > 0.0 {
            "puts bid over calls"
        } else if metrics.skew_spread < 0.0 {
            "calls bid over puts"
        } else {
            "balanced smile"
        };
        let mut rationale = format!(
            "Put skew {:+.1}% vs call skew {:+.1}% against ATM IV {:.1}% (spread {:+.1} pts): {}",
            metrics.put_skew * 100.0,
            metrics.call_skew * 100.0,
            metrics.atm_iv * 100.0,
            metrics.skew_spread * 100.0,
            reading
        );
        if let Some(rr) = metrics.risk_reversal {
            rationale.push_str(&format!(", 10-15% OTM risk reversal {:+.1} vol pts", rr * 100.0));
        }

        Ok(make_signal_result(
            self.name(),
            score,
            self.adjusted_confidence(confidence),
            THRESHOLD,
            rationale,
        )?
        .with_detail("atm_iv", metrics.atm_iv)
        .with_detail("atm_source", metrics.atm_source.as_str())
        .with_detail("mean_put_iv", metrics.mean_put_iv)
        .with_detail("mean_call_iv", metrics.mean_call_iv)
        .with_detail("put_skew", metrics.put_skew)
        .with_detail("call_skew", metrics.call_skew)
        .with_detail("skew_spread", metrics.skew_spread)
        .with_detail("risk_reversal", metrics.risk_reversal)
        .with_detail("put_count", metrics.put_count)
        .with_detail("call_count", metrics.call_count))
    }
}
