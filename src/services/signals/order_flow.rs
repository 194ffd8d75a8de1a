//! Options order-flow aggression signal.

use crate::error::{Result, SignalError};
use crate::services::signals::indicators::{flow_aggression, FlowMetrics};
use crate::services::signals::{clamp_score, make_signal_result, required, Signal, SignalSettings};
use crate::types::{PayloadField, SignalKind, SignalPayload, SignalResult};

const THRESHOLD: f64 = 20.0;
const MAX_CONFIDENCE: f64 = 90.0;
/// Aggression (5% through the mid) that maps to a full-strength score.
const FULL_AGGRESSION: f64 = 0.05;
/// Block share above which the score is amplified.
const BLOCK_AMPLIFY_SHARE: f64 = 0.3;

const REQUIRED: &[PayloadField] = &[PayloadField::OrderFlow];

/// Who is crossing the spread, and in what size.
pub struct OrderFlowSignal {
    settings: SignalSettings,
}

impl Default for OrderFlowSignal {
    fn default() -> Self {
        Self::new(SignalSettings::for_kind(SignalKind::OrderFlow))
    }
}

impl OrderFlowSignal {
    pub fn new(settings: SignalSettings) -> Self {
        Self { settings }
    }

    fn score(flow: &FlowMetrics) -> f64 {
        let aggression_score = clamp_score(flow.aggression / FULL_AGGRESSION * 100.0);
        let flow_bias = flow.volume_bias() * 100.0;
        let block_bias = flow.block_bias() * 100.0;

        let score = 0.5 * aggression_score + 0.3 * flow_bias + 0.2 * block_bias;
        if flow.block_share > BLOCK_AMPLIFY_SHARE {
            score * (1.0 + 0.5 * flow.block_share)
        } else {
            score
        }
    }

    fn confidence(flow: &FlowMetrics) -> f64 {
        let mut confidence = if flow.total_volume < 100.0 {
            30.0
        } else if flow.total_volume < 1_000.0 {
            45.0
        } else if flow.total_volume < 10_000.0 {
            60.0
        } else {
            70.0
        };
        confidence += 20.0 * flow.block_share;

        let bias = flow.volume_bias();
        if flow.aggression != 0.0 && bias != 0.0 && flow.aggression.signum() == bias.signum() {
            confidence += 10.0;
        }

        confidence.min(MAX_CONFIDENCE)
    }
}

impl Signal for OrderFlowSignal {
    fn name(&self) -> &str {
        SignalKind::OrderFlow.name()
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
        let contracts = required(payload.order_flow.as_deref(), PayloadField::OrderFlow)?;
        if contracts.is_empty() {
            return Err(SignalError::InsufficientData(
                "order flow table is empty".to_string(),
            ));
        }

        let flow = flow_aggression(contracts);
        if flow.total_volume <= 0.0 {
            return Err(SignalError::InsufficientData(
                "order flow has no traded volume".to_string(),
            ));
        }

        if !flow.total_volume.is_finite() {
            return Err(SignalError::Computation(
                "order flow volume overflowed".to_string(),
            ));
        }

        let score = Self::score(&flow);
        let confidence = Self::confidence(&flow);

        let rationale = format!(
            "Aggression {:+.2}% through the mid on {:.0} contracts, call/put volume {:.0}/{:.0}, {:.0}% of volume in blocks",
            flow.aggression * 100.0,
            flow.total_volume,
            flow.call_volume,
            flow.put_volume,
            flow.block_share * 100.0
        );

        Ok(make_signal_result(
            self.name(),
            score,
            self.adjusted_confidence(confidence),
            THRESHOLD,
            rationale,
        )?
        .with_detail("aggression", flow.aggression)
        .with_detail("call_volume", flow.call_volume)
        .with_detail("put_volume", flow.put_volume)
        .with_detail("total_volume", flow.total_volume)
        .with_detail("block_share", flow.block_share)
        .with_detail("block_call_volume", flow.block_call_volume)
        .with_detail("block_put_volume", flow.block_put_volume))
    }
}
