//! Directional signals and their aggregation.
//!
//! Each signal turns one data domain of a [`SignalPayload`] into a
//! [`SignalResult`]; the [`SignalAggregator`] merges them into a
//! [`DirectionalScore`](crate::types::DirectionalScore).

pub mod aggregator;
pub mod alt_data;
pub mod indicators;
pub mod options_skew;
pub mod order_flow;
pub mod trend_regime;
pub mod unusual_volume;
pub mod volume_profile;

pub use aggregator::{AggregatorConfig, SignalAggregator};
pub use alt_data::AltDataSignal;
pub use options_skew::OptionsSkewSignal;
pub use order_flow::OrderFlowSignal;
pub use trend_regime::TrendRegimeSignal;
pub use unusual_volume::UnusualVolumeSignal;
pub use volume_profile::VolumeProfileSignal;

use crate::config::Config;
use crate::error::{Result, SignalError};
use crate::types::{Direction, PayloadField, SignalKind, SignalPayload, SignalResult};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Trait implemented by every directional signal.
///
/// Signals are pure functions of the payload plus their static weight and
/// calibration; they hold no mutable state.
pub trait Signal: Send + Sync {
    /// Human-readable name, used as `signal_name` on results.
    fn name(&self) -> &str;

    /// Aggregation weight in (0, 1].
    fn weight(&self) -> f64;

    /// Historical hit rate (0-100) from an external backtest, if known.
    fn historical_accuracy(&self) -> Option<f64> {
        None
    }

    /// Payload fields this signal needs.
    fn required_data(&self) -> &'static [PayloadField];

    /// True iff every required field is present and not null.
    fn validate_data(&self, payload: &SignalPayload) -> bool {
        self.required_data().iter().all(|field| payload.has(*field))
    }

    /// Compute the signal.
    ///
    /// Degenerate but well-typed input (empty tables, zero prices, short
    /// history) is reported as [`SignalError::InsufficientData`] rather than a
    /// panic; [`evaluate_signal`] turns it into a neutral result.
    fn calculate(&self, payload: &SignalPayload) -> Result<SignalResult>;

    /// Scale a raw confidence by historical accuracy, when calibrated.
    fn adjusted_confidence(&self, raw: f64) -> f64 {
        match self.historical_accuracy() {
            Some(accuracy) => raw * accuracy.clamp(0.0, 100.0) / 100.0,
            None => raw,
        }
    }
}

/// Static per-signal settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalSettings {
    pub weight: f64,
    pub historical_accuracy: Option<f64>,
}

impl SignalSettings {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            historical_accuracy: None,
        }
    }

    pub fn with_historical_accuracy(mut self, accuracy: f64) -> Self {
        self.historical_accuracy = Some(accuracy);
        self
    }

    /// Default settings for a kind: default weight, uncalibrated.
    pub fn for_kind(kind: SignalKind) -> Self {
        Self::new(kind.default_weight())
    }
}

/// Build a result, clamping the score and classifying it against `threshold`.
///
/// Infinite scores saturate at ±100. A NaN score or a non-finite confidence
/// is a computation fault, not a neutral reading.
pub fn make_signal_result(
    name: &str,
    score: f64,
    confidence: f64,
    threshold: f64,
    rationale: String,
) -> Result<SignalResult> {
    if score.is_nan() {
        return Err(SignalError::Computation(format!("{} produced a NaN score", name)));
    }
    if !confidence.is_finite() {
        return Err(SignalError::Computation(format!(
            "{} produced a non-finite confidence",
            name
        )));
    }
    let score = clamp_score(score);
    Ok(SignalResult::new(
        name,
        Direction::from_score(score, threshold),
        score,
        confidence,
        rationale,
    ))
}

/// Unwrap a payload field or report it missing.
pub fn required<T>(value: Option<T>, field: PayloadField) -> Result<T> {
    value.ok_or_else(|| SignalError::MissingData(field.to_string()))
}

/// Clamp to [-100, 100].
pub fn clamp_score(value: f64) -> f64 {
    value.clamp(-100.0, 100.0)
}

/// Build a configured signal instance.
pub fn build_signal(kind: SignalKind, settings: SignalSettings) -> Box<dyn Signal> {
    match kind {
        SignalKind::OptionsSkew => Box::new(OptionsSkewSignal::new(settings)),
        SignalKind::OrderFlow => Box::new(OrderFlowSignal::new(settings)),
        SignalKind::UnusualVolume => Box::new(UnusualVolumeSignal::new(settings)),
        SignalKind::TrendRegime => Box::new(TrendRegimeSignal::new(settings)),
        SignalKind::VolumeProfile => Box::new(VolumeProfileSignal::new(settings)),
        SignalKind::AltData => Box::new(AltDataSignal::new(settings)),
    }
}

impl SignalKind {
    /// Build this kind with an explicit weight and optional calibration.
    pub fn build(&self, weight: f64, historical_accuracy: Option<f64>) -> Box<dyn Signal> {
        let settings = SignalSettings {
            weight,
            historical_accuracy,
        };
        build_signal(*self, settings)
    }
}

/// All signals with default weights, in canonical order.
pub fn default_signals() -> Vec<Box<dyn Signal>> {
    SignalKind::ALL
        .iter()
        .map(|kind| build_signal(*kind, SignalSettings::for_kind(*kind)))
        .collect()
}

/// Signals enabled by a configuration, in configured order.
pub fn configured_signals(config: &Config) -> Vec<Box<dyn Signal>> {
    config
        .signals
        .iter()
        .map(|kind| build_signal(*kind, config.settings_for(*kind)))
        .collect()
}

/// Run one signal with full fault isolation.
///
/// Always yields exactly one result: missing fields, data-quality errors,
/// computation errors and panics all become a neutral, zero-confidence
/// result whose rationale names the reason.
pub fn evaluate_signal(signal: &dyn Signal, payload: &SignalPayload) -> SignalResult {
    let name = signal.name();

    if !signal.validate_data(payload) {
        let missing: Vec<&str> = payload
            .missing(signal.required_data())
            .iter()
            .map(|f| f.as_str())
            .collect();
        debug!("{} skipped, missing data: {:?}", name, missing);
        return SignalResult::neutral(
            name,
            format!("Missing required data: {}", missing.join(", ")),
        )
        .with_detail("missing", missing);
    }

    match panic::catch_unwind(AssertUnwindSafe(|| signal.calculate(payload))) {
        Ok(Ok(result)) => {
            debug!(
                "{}: {} score={:.1} confidence={:.1}",
                name, result.direction, result.score, result.confidence
            );
            result
        }
        Ok(Err(err)) if err.is_data_quality() => {
            debug!("{} neutral: {}", name, err);
            SignalResult::neutral(name, err.to_string()).with_detail("reason", err.to_string())
        }
        Ok(Err(err)) => {
            warn!("{} failed: {}", name, err);
            SignalResult::neutral(name, format!("Signal failed: {}", err))
                .with_detail("error", err.to_string())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!("{} panicked: {}", name, message);
            SignalResult::neutral(name, format!("Signal failed: {}", message))
                .with_detail("error", message)
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        accuracy: Option<f64>,
        outcome: fn() -> Result<SignalResult>,
    }

    impl Signal for Fixed {
        fn name(&self) -> &str {
            "Fixed"
        }

        fn weight(&self) -> f64 {
            1.0
        }

        fn historical_accuracy(&self) -> Option<f64> {
            self.accuracy
        }

        fn required_data(&self) -> &'static [PayloadField] {
            &[PayloadField::CurrentPrice]
        }

        fn calculate(&self, _payload: &SignalPayload) -> Result<SignalResult> {
            (self.outcome)()
        }
    }

    fn fixed(outcome: fn() -> Result<SignalResult>) -> Fixed {
        Fixed {
            accuracy: None,
            outcome,
        }
    }

    fn priced() -> SignalPayload {
        SignalPayload::new().with_current_price(100.0)
    }

    #[test]
    fn test_adjusted_confidence() {
        let mut signal = fixed(|| Err(SignalError::Computation("unused".into())));
        assert_eq!(signal.adjusted_confidence(80.0), 80.0);
        signal.accuracy = Some(60.0);
        assert!((signal.adjusted_confidence(80.0) - 48.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_data() {
        let signal = fixed(|| Err(SignalError::Computation("unused".into())));
        assert!(signal.validate_data(&priced()));
        assert!(!signal.validate_data(&SignalPayload::new()));
    }

    #[test]
    fn test_evaluate_missing_data() {
        let signal = fixed(|| panic!("must not run"));
        let result = evaluate_signal(&signal, &SignalPayload::new());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.direction, Direction::Neutral);
        assert!(result.rationale.contains("current_price"));
    }

    #[test]
    fn test_evaluate_data_quality_error() {
        let signal = fixed(|| Err(SignalError::InsufficientData("only 3 candles".into())));
        let result = evaluate_signal(&signal, &priced());
        assert_eq!(result.confidence, 0.0);
        assert!(result.rationale.contains("only 3 candles"));
        assert!(!result.details.contains_key("error"));
    }

    #[test]
    fn test_evaluate_computation_error() {
        let signal = fixed(|| Err(SignalError::Computation("matrix singular".into())));
        let result = evaluate_signal(&signal, &priced());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(
            result.details.get("error").and_then(|v| v.as_str()),
            Some("Computation error: matrix singular")
        );
    }

    #[test]
    fn test_evaluate_panic_is_contained() {
        let signal = fixed(|| panic!("index out of bounds"));
        let result = evaluate_signal(&signal, &priced());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(
            result.details.get("error").and_then(|v| v.as_str()),
            Some("index out of bounds")
        );
    }

    #[test]
    fn test_make_signal_result_clamps_before_classifying() {
        let result = make_signal_result("Test", 180.0, 50.0, 15.0, "big".into()).unwrap();
        assert_eq!(result.score, 100.0);
        assert_eq!(result.direction, Direction::Bullish);

        let result = make_signal_result("Test", f64::INFINITY, 50.0, 15.0, "inf".into()).unwrap();
        assert_eq!(result.score, 100.0);
        assert_eq!(result.direction, Direction::Bullish);

        let result =
            make_signal_result("Test", f64::NEG_INFINITY, 50.0, 15.0, "-inf".into()).unwrap();
        assert_eq!(result.score, -100.0);
        assert_eq!(result.direction, Direction::Bearish);
    }

    #[test]
    fn test_make_signal_result_rejects_nan() {
        let err = make_signal_result("Test", f64::NAN, 50.0, 15.0, "nan".into()).unwrap_err();
        assert!(matches!(err, SignalError::Computation(_)));

        let err = make_signal_result("Test", 20.0, f64::NAN, 15.0, "nan".into()).unwrap_err();
        assert!(matches!(err, SignalError::Computation(_)));
    }

    #[test]
    fn test_evaluate_nan_score_is_a_fault() {
        let signal = fixed(|| make_signal_result("Fixed", f64::NAN, 90.0, 15.0, "nan".into()));
        let result = evaluate_signal(&signal, &priced());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.direction, Direction::Neutral);
        assert!(result.details.contains_key("error"));
    }

    #[test]
    fn test_default_signals_cover_every_kind() {
        let signals = default_signals();
        let names: Vec<&str> = signals.iter().map(|s| s.name()).collect();
        let expected: Vec<&str> = SignalKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, expected);
    }
}
