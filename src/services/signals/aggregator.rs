//! Signal aggregation.
//!
//! Runs every configured signal against one payload and merges the results
//! into a single [`DirectionalScore`]:
//! 1. Each signal yields exactly one result, in configuration order
//! 2. Results above the confidence floor are weighted by `weight * confidence`
//! 3. Confidence blends agreement, average confidence and coverage, minus a
//!    penalty when bullish and bearish camps coexist

use crate::config::Config;
use crate::services::signals::{configured_signals, evaluate_signal, Signal};
use crate::types::{
    ConfidenceTier, Direction, DirectionalScore, SignalBreakdown, SignalContribution,
    SignalPayload, SignalResult,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Allowed drift of the weight sum from 1.0 before warning.
const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Static aggregation constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatorConfig {
    /// Results at or below this confidence are excluded from weighting.
    pub min_confidence: f64,
    /// Scores beyond +/- this count as a bullish or bearish vote.
    pub agreement_threshold: f64,
    /// Aggregate scores beyond +/- this set the direction.
    pub direction_threshold: f64,
    /// Ceiling on aggregate confidence.
    pub max_confidence: f64,
    /// Evaluate signals on the rayon pool.
    pub parallel: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            min_confidence: 10.0,
            agreement_threshold: 20.0,
            direction_threshold: 15.0,
            max_confidence: 95.0,
            parallel: false,
        }
    }
}

impl From<&Config> for AggregatorConfig {
    fn from(config: &Config) -> Self {
        Self {
            min_confidence: config.min_confidence,
            parallel: config.parallel,
            ..Self::default()
        }
    }
}

/// Combines configured signals into a directional verdict.
pub struct SignalAggregator {
    signals: Vec<Box<dyn Signal>>,
    config: AggregatorConfig,
}

impl SignalAggregator {
    pub fn new(signals: Vec<Box<dyn Signal>>) -> Self {
        Self::with_config(signals, AggregatorConfig::default())
    }

    /// Build with explicit constants.
    ///
    /// Weights are expected to sum to 1.0; drift is logged, never corrected.
    pub fn with_config(signals: Vec<Box<dyn Signal>>, config: AggregatorConfig) -> Self {
        let aggregator = Self { signals, config };

        let sum = aggregator.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(
                "Signal weights sum to {:.3}, expected 1.0 ({} signals)",
                sum,
                aggregator.signals.len()
            );
        }

        aggregator
    }

    /// Build from environment configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::with_config(configured_signals(config), AggregatorConfig::from(config))
    }

    pub fn signals(&self) -> &[Box<dyn Signal>] {
        &self.signals
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn weight_sum(&self) -> f64 {
        self.signals.iter().map(|s| s.weight()).sum()
    }

    /// Evaluate every signal, one result each, in configuration order.
    pub fn evaluate(&self, payload: &SignalPayload) -> Vec<SignalResult> {
        if self.config.parallel {
            self.signals
                .par_iter()
                .map(|signal| evaluate_signal(signal.as_ref(), payload))
                .collect()
        } else {
            self.signals
                .iter()
                .map(|signal| evaluate_signal(signal.as_ref(), payload))
                .collect()
        }
    }

    /// Aggregate all signals for a symbol.
    ///
    /// Never fails: a payload on which every signal degrades still produces
    /// a neutral, zero-confidence score.
    pub fn aggregate(&self, symbol: &str, payload: &SignalPayload) -> DirectionalScore {
        let results = self.evaluate(payload);

        let (score, confidence, qualifying) = self.combine(&results);
        let direction = Direction::from_score(score, self.config.direction_threshold);
        let recommendation = recommendation(direction, confidence);

        info!(
            "{}: {} score={:.1} confidence={:.1} ({}/{} signals qualified)",
            symbol,
            direction,
            score,
            confidence,
            qualifying,
            results.len()
        );

        DirectionalScore {
            symbol: symbol.to_string(),
            direction,
            score,
            confidence,
            signals: results,
            recommendation,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Weighted score, aggregate confidence and qualifying count.
    fn combine(&self, results: &[SignalResult]) -> (f64, f64, usize) {
        let qualifying: Vec<(&SignalResult, f64)> = results
            .iter()
            .zip(self.signals.iter())
            .filter(|(result, _)| result.confidence > self.config.min_confidence)
            .map(|(result, signal)| (result, signal.weight() * result.confidence / 100.0))
            .collect();

        let total_weight: f64 = qualifying.iter().map(|(_, ew)| ew).sum();
        if qualifying.is_empty() || total_weight <= 0.0 {
            debug!("No signal qualified for weighting");
            return (0.0, 0.0, qualifying.len());
        }

        let score = (qualifying.iter().map(|(r, ew)| r.score * ew).sum::<f64>() / total_weight)
            .clamp(-100.0, 100.0);

        let count = qualifying.len() as f64;
        let threshold = self.config.agreement_threshold;
        let bullish = qualifying.iter().filter(|(r, _)| r.score > threshold).count();
        let bearish = qualifying.iter().filter(|(r, _)| r.score < -threshold).count();
        let rest = qualifying.len() - bullish - bearish;

        let agreement = bullish.max(bearish).max(rest) as f64 / count * 100.0;
        let avg_confidence = qualifying.iter().map(|(r, _)| r.confidence).sum::<f64>() / count;
        let diversification = 10.0 * count / results.len() as f64;

        let mut confidence = 0.4 * agreement + 0.5 * avg_confidence + diversification;
        if bullish > 0 && bearish > 0 {
            let penalty = bullish.min(bearish) as f64 / count * 20.0;
            debug!(
                "Conflicting signals ({} bullish, {} bearish), confidence -{:.1}",
                bullish, bearish, penalty
            );
            confidence -= penalty;
        }

        (
            score,
            confidence.clamp(0.0, self.config.max_confidence),
            qualifying.len(),
        )
    }

    /// Per-signal transparency report for an already computed score.
    ///
    /// Results are paired with configured weights by position; no signal is
    /// re-evaluated.
    pub fn signal_breakdown(&self, score: &DirectionalScore) -> SignalBreakdown {
        let signals = score
            .signals
            .iter()
            .zip(self.signals.iter())
            .map(|(result, signal)| {
                let weight = signal.weight();
                SignalContribution {
                    name: result.signal_name.clone(),
                    direction: result.direction,
                    score: result.score,
                    confidence: result.confidence,
                    weight,
                    weighted_contribution: result.score * weight * result.confidence / 100.0,
                    rationale: result.rationale.clone(),
                }
            })
            .collect();

        SignalBreakdown {
            symbol: score.symbol.clone(),
            direction: score.direction,
            score: score.score,
            confidence: score.confidence,
            recommendation: score.recommendation.clone(),
            signals,
        }
    }
}

/// Recommendation text for a direction at a confidence level.
pub fn recommendation(direction: Direction, confidence: f64) -> String {
    let tier = ConfidenceTier::from_confidence(confidence);
    let action = match (direction, tier) {
        (Direction::Bullish, ConfidenceTier::Strong) => "favor long calls or call debit spreads",
        (Direction::Bullish, ConfidenceTier::Moderate) => "favor call spreads with defined risk",
        (Direction::Bullish, ConfidenceTier::Weak) => "small call positions only, wait for confirmation",
        (Direction::Bullish, ConfidenceTier::VeryWeak) => "slight call bias, no clear edge",
        (Direction::Bearish, ConfidenceTier::Strong) => "favor long puts or put debit spreads",
        (Direction::Bearish, ConfidenceTier::Moderate) => "favor put spreads with defined risk",
        (Direction::Bearish, ConfidenceTier::Weak) => "small put positions only, wait for confirmation",
        (Direction::Bearish, ConfidenceTier::VeryWeak) => "slight put bias, no clear edge",
        (Direction::Neutral, ConfidenceTier::Strong | ConfidenceTier::Moderate) => {
            "favor neutral strategies such as iron condors or short strangles"
        }
        (Direction::Neutral, _) => "no directional edge, stay flat",
    };
    format!("{} {}: {}", tier.label(), direction.label(), action)
}
