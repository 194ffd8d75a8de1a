//! Unusual options volume signal.

use crate::error::{Result, SignalError};
use crate::services::signals::{make_signal_result, required, Signal, SignalSettings};
use crate::types::{OptionContract, OptionType, PayloadField, SignalKind, SignalPayload, SignalResult};

const THRESHOLD: f64 = 20.0;
const MAX_CONFIDENCE: f64 = 90.0;
/// Score points per unit of z-score spread.
const POINTS_PER_Z: f64 = 25.0;
/// Price moves smaller than this (percent) neither confirm nor contradict.
const MIN_PRICE_MOVE: f64 = 0.5;
const CONFIRM_MULTIPLIER: f64 = 1.2;
const DIVERGE_MULTIPLIER: f64 = 0.7;

const REQUIRED: &[PayloadField] = &[
    PayloadField::OptionsChain,
    PayloadField::VolumeStats,
    PayloadField::RecentPriceChange,
];

/// Compares today's call and put volume to their own history.
///
/// Calls trading far above normal while puts do not is bullish; the read is
/// trusted more when the underlying is already moving the same way.
pub struct UnusualVolumeSignal {
    settings: SignalSettings,
}

impl Default for UnusualVolumeSignal {
    fn default() -> Self {
        Self::new(SignalSettings::for_kind(SignalKind::UnusualVolume))
    }
}

impl UnusualVolumeSignal {
    pub fn new(settings: SignalSettings) -> Self {
        Self { settings }
    }
}

fn side_volume(chain: &[OptionContract], side: OptionType) -> f64 {
    chain
        .iter()
        .filter(|c| c.option_type == side)
        .map(|c| c.volume_or_zero())
        .sum()
}

fn z_score(value: f64, mean: f64, std: f64, label: &str) -> Result<f64> {
    if !std.is_finite() || std <= 0.0 || !mean.is_finite() {
        return Err(SignalError::InsufficientData(format!(
            "{} volume history has no dispersion (std {})",
            label, std
        )));
    }
    let z = (value - mean) / std;
    if !z.is_finite() {
        return Err(SignalError::Computation(format!(
            "{} volume z-score overflowed (std {:e})",
            label, std
        )));
    }
    Ok(z)
}

fn base_confidence(max_z: f64) -> f64 {
    if max_z < 1.0 {
        25.0
    } else if max_z < 2.0 {
        45.0
    } else if max_z < 3.0 {
        65.0
    } else {
        80.0
    }
}

impl Signal for UnusualVolumeSignal {
    fn name(&self) -> &str {
        SignalKind::UnusualVolume.name()
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
        let chain = required(payload.options_chain.as_deref(), PayloadField::OptionsChain)?;
        let stats = required(payload.volume_stats, PayloadField::VolumeStats)?;
        let price_change =
            required(payload.recent_price_change, PayloadField::RecentPriceChange)?;

        let call_volume = side_volume(chain, OptionType::Call);
        let put_volume = side_volume(chain, OptionType::Put);
        let call_z = z_score(call_volume, stats.avg_call_volume, stats.std_call_volume, "call")?;
        let put_z = z_score(put_volume, stats.avg_put_volume, stats.std_put_volume, "put")?;

        let mut score = (call_z - put_z) * POINTS_PER_Z;
        let mut confirmed = false;
        if price_change.abs() >= MIN_PRICE_MOVE && score != 0.0 {
            if price_change.signum() == score.signum() {
                score *= CONFIRM_MULTIPLIER;
                confirmed = true;
            } else {
                score *= DIVERGE_MULTIPLIER;
            }
        }

        let mut confidence = base_confidence(call_z.abs().max(put_z.abs()));
        if confirmed {
            confidence += 10.0;
        }

        let price_read = if confirmed {
            "confirmed by"
        } else if price_change.abs() >= MIN_PRICE_MOVE && score != 0.0 {
            "against"
        } else {
            "with no clear"
        };
        let rationale = format!(
            "Call volume {:.0} (z {:+.2}) vs put volume {:.0} (z {:+.2}), {} price move of {:+.2}%",
            call_volume, call_z, put_volume, put_z, price_read, price_change
        );

        Ok(make_signal_result(
            self.name(),
            score,
            self.adjusted_confidence(confidence.min(MAX_CONFIDENCE)),
            THRESHOLD,
            rationale,
        )?
        .with_detail("call_volume", call_volume)
        .with_detail("put_volume", put_volume)
        .with_detail("call_z", call_z)
        .with_detail("put_z", put_z)
        .with_detail("price_change_pct", price_change)
        .with_detail("price_confirmed", confirmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, VolumeStats};

    fn payload(call_volume: f64, put_volume: f64, price_change: f64) -> SignalPayload {
        let chain = vec![
            OptionContract::new(OptionType::Call, 105.0, 0.4).with_activity(call_volume / 2.0, 5_000.0),
            OptionContract::new(OptionType::Call, 110.0, 0.4).with_activity(call_volume / 2.0, 5_000.0),
            OptionContract::new(OptionType::Put, 95.0, 0.4).with_activity(put_volume, 5_000.0),
        ];
        SignalPayload::new()
            .with_options_chain(chain)
            .with_volume_stats(VolumeStats {
                avg_call_volume: 1_000.0,
                std_call_volume: 200.0,
                avg_put_volume: 1_000.0,
                std_put_volume: 200.0,
            })
            .with_recent_price_change(price_change)
    }

    #[test]
    fn test_call_surge_confirmed_by_price() {
        let result = UnusualVolumeSignal::default()
            .calculate(&payload(1_800.0, 1_000.0, 2.0))
            .unwrap();
        assert_eq!(result.direction, Direction::Bullish);
        assert_eq!(result.score, 100.0);
        // z = 4: 80 + 10 for confirmation
        assert_eq!(result.confidence, 90.0);
    }

    #[test]
    fn test_divergent_price_dampens_score() {
        let result = UnusualVolumeSignal::default()
            .calculate(&payload(1_400.0, 1_000.0, -2.0))
            .unwrap();
        // (2 - 0) * 25 * 0.7
        assert!((result.score - 35.0).abs() < 1e-9);
        assert_eq!(result.confidence, 65.0);
    }

    #[test]
    fn test_small_price_move_is_ignored() {
        let result = UnusualVolumeSignal::default()
            .calculate(&payload(1_000.0, 1_300.0, 0.2))
            .unwrap();
        // (0 - 1.5) * 25
        assert!((result.score + 37.5).abs() < 1e-9);
        assert_eq!(result.direction, Direction::Bearish);
        assert_eq!(result.confidence, 45.0);
    }

    #[test]
    fn test_zero_std_is_insufficient() {
        let mut p = payload(1_000.0, 1_000.0, 0.0);
        p.volume_stats = Some(VolumeStats {
            avg_call_volume: 1_000.0,
            std_call_volume: 0.0,
            avg_put_volume: 1_000.0,
            std_put_volume: 200.0,
        });
        let err = UnusualVolumeSignal::default().calculate(&p).unwrap_err();
        assert!(matches!(err, SignalError::InsufficientData(_)));
    }

    #[test]
    fn test_denormal_std_is_a_fault() {
        let mut p = payload(5_000.0, 1_000.0, 0.0);
        p.volume_stats = Some(VolumeStats {
            avg_call_volume: 1_000.0,
            std_call_volume: 1e-320,
            avg_put_volume: 1_000.0,
            std_put_volume: 200.0,
        });
        let signal = UnusualVolumeSignal::default();
        let err = signal.calculate(&p).unwrap_err();
        assert!(matches!(err, SignalError::Computation(_)));

        let result = crate::services::signals::evaluate_signal(&signal, &p);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.direction, Direction::Neutral);
        assert!(result.details.contains_key("error"));
    }
}
