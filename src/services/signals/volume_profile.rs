//! Volume profile signal: price location versus the value area.

use crate::error::{Result, SignalError};
use crate::services::signals::indicators::profile::MIN_SAMPLES;
use crate::services::signals::indicators::{volume_profile, VolumeProfile};
use crate::services::signals::{make_signal_result, required, Signal, SignalSettings};
use crate::types::{PayloadField, SignalKind, SignalPayload, SignalResult};

const THRESHOLD: f64 = 15.0;
const MAX_CONFIDENCE: f64 = 85.0;
/// Breakout distance (fraction of the edge price) that earns the full bonus.
const FULL_BREAKOUT: f64 = 0.02;

const REQUIRED: &[PayloadField] = &[PayloadField::CurrentPrice, PayloadField::PriceHistory];

/// Acceptance above the value area is bullish, below it bearish.
pub struct VolumeProfileSignal {
    settings: SignalSettings,
}

impl Default for VolumeProfileSignal {
    fn default() -> Self {
        Self::new(SignalSettings::for_kind(SignalKind::VolumeProfile))
    }
}

impl VolumeProfileSignal {
    pub fn new(settings: SignalSettings) -> Self {
        Self { settings }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Above,
    Below,
    Inside,
}

impl Location {
    fn of(price: f64, profile: &VolumeProfile) -> Self {
        if price > profile.value_area_high {
            Location::Above
        } else if price < profile.value_area_low {
            Location::Below
        } else {
            Location::Inside
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Location::Above => "above the value area",
            Location::Below => "below the value area",
            Location::Inside => "inside the value area",
        }
    }
}

fn position_score(price: f64, profile: &VolumeProfile, location: Location) -> f64 {
    match location {
        Location::Above => {
            let distance = (price - profile.value_area_high) / profile.value_area_high;
            40.0 + (distance / FULL_BREAKOUT).min(1.0) * 50.0
        }
        Location::Below => {
            let distance = (profile.value_area_low - price) / profile.value_area_low;
            -(40.0 + (distance / FULL_BREAKOUT).min(1.0) * 50.0)
        }
        Location::Inside => {
            let half_width = (profile.value_area_high - profile.value_area_low) / 2.0;
            if half_width > 0.0 {
                (price - profile.poc) / half_width * 30.0
            } else {
                0.0
            }
        }
    }
}

impl Signal for VolumeProfileSignal {
    fn name(&self) -> &str {
        SignalKind::VolumeProfile.name()
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
        let price = required(payload.current_price, PayloadField::CurrentPrice)?;
        let candles = required(payload.price_history.as_deref(), PayloadField::PriceHistory)?;

        if !price.is_finite() || price <= 0.0 {
            return Err(SignalError::InsufficientData(format!(
                "current price must be positive, got {}",
                price
            )));
        }
        if candles.len() < MIN_SAMPLES {
            return Err(SignalError::InsufficientData(format!(
                "need {} candles for a volume profile, got {}",
                MIN_SAMPLES,
                candles.len()
            )));
        }

        let profile = volume_profile(candles).ok_or_else(|| {
            SignalError::InsufficientData("price history carries no usable volume".to_string())
        })?;

        let location = Location::of(price, &profile);
        let (above, below) = profile.volume_above_below_poc();
        let skew = 10.0 * (above - below) / profile.total_volume;
        let score = position_score(price, &profile, location) + skew;

        let mut confidence = 40.0;
        if candles.len() >= 100 {
            confidence += 15.0;
        } else if candles.len() >= 50 {
            confidence += 10.0;
        }
        confidence += (profile.poc_share() * 100.0).min(20.0);
        if location != Location::Inside {
            confidence += 10.0;
        }

        let rationale = format!(
            "Price {:.2} is {} [{:.2}, {:.2}] with POC {:.2} holding {:.1}% of volume",
            price,
            location.as_str(),
            profile.value_area_low,
            profile.value_area_high,
            profile.poc,
            profile.poc_share() * 100.0
        );

        Ok(make_signal_result(
            self.name(),
            score,
            self.adjusted_confidence(confidence.min(MAX_CONFIDENCE)),
            THRESHOLD,
            rationale,
        )?
        .with_detail("poc", profile.poc)
        .with_detail("value_area_low", profile.value_area_low)
        .with_detail("value_area_high", profile.value_area_high)
        .with_detail("value_area_share", profile.value_area_share())
        .with_detail("poc_share", profile.poc_share())
        .with_detail("bins", profile.bin_count())
        .with_detail("bin_width", profile.bin_width)
        .with_detail("value_area_bins", vec![profile.value_area_bins.0, profile.value_area_bins.1])
        .with_detail("samples", candles.len()))
    }
}
