//! Options implied-volatility skew statistics.

use crate::error::{Result, SignalError};
use crate::types::{OptionContract, OptionType};

/// OTM band used for the skew comparison, as a fraction of spot.
pub const SKEW_BAND: (f64, f64) = (0.05, 0.15);
/// Deeper OTM band used for the risk reversal.
pub const RISK_REVERSAL_BAND: (f64, f64) = (0.10, 0.15);
/// Contracts within this distance of spot count as at the money.
pub const ATM_BAND: f64 = 0.025;
/// Minimum in-band contracts per side.
pub const MIN_PER_SIDE: usize = 2;

/// Tolerance for band edges computed from decimal strikes.
const BAND_TOLERANCE: f64 = 1e-9;

/// Where the ATM volatility came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtmSource {
    /// Supplied with the payload.
    Provided,
    /// Mean IV of contracts near the money.
    NearMoney,
    /// Mean of the put and call wing averages.
    WingMidpoint,
}

impl AtmSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtmSource::Provided => "provided",
            AtmSource::NearMoney => "near_money",
            AtmSource::WingMidpoint => "wing_midpoint",
        }
    }
}

/// Skew statistics for one chain snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewMetrics {
    pub atm_iv: f64,
    pub atm_source: AtmSource,
    pub mean_put_iv: f64,
    pub mean_call_iv: f64,
    /// (put IV - ATM) / ATM
    pub put_skew: f64,
    /// (call IV - ATM) / ATM
    pub call_skew: f64,
    /// put_skew - call_skew. Positive = downside protection is bid.
    pub skew_spread: f64,
    /// Put IV minus call IV in the 10-15% OTM band, when both sides trade there.
    pub risk_reversal: Option<f64>,
    pub put_count: usize,
    pub call_count: usize,
}

fn in_band(otm: f64, band: (f64, f64)) -> bool {
    otm >= band.0 - BAND_TOLERANCE && otm <= band.1 + BAND_TOLERANCE
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn band_ivs(chain: &[OptionContract], spot: f64, side: OptionType, band: (f64, f64)) -> Vec<f64> {
    chain
        .iter()
        .filter(|c| c.option_type == side)
        .filter(|c| c.implied_volatility.is_finite() && c.implied_volatility > 0.0)
        .filter(|c| in_band(c.otm_fraction(spot), band))
        .map(|c| c.implied_volatility)
        .collect()
}

/// Compare OTM put and call IV against ATM IV.
///
/// ATM IV comes from `atm_hint` when positive, otherwise from contracts
/// within [`ATM_BAND`] of spot, otherwise from the midpoint of the wings.
pub fn options_skew(
    chain: &[OptionContract],
    spot: f64,
    atm_hint: Option<f64>,
) -> Result<SkewMetrics> {
    if !spot.is_finite() || spot <= 0.0 {
        return Err(SignalError::InsufficientData(format!(
            "current price must be positive, got {}",
            spot
        )));
    }

    let puts = band_ivs(chain, spot, OptionType::Put, SKEW_BAND);
    let calls = band_ivs(chain, spot, OptionType::Call, SKEW_BAND);
    if puts.len() < MIN_PER_SIDE || calls.len() < MIN_PER_SIDE {
        return Err(SignalError::InsufficientData(format!(
            "need {} puts and {} calls 5-15% OTM, found {} and {}",
            MIN_PER_SIDE,
            MIN_PER_SIDE,
            puts.len(),
            calls.len()
        )));
    }

    let mean_put_iv = mean(&puts).unwrap_or_default();
    let mean_call_iv = mean(&calls).unwrap_or_default();

    let near_money: Vec<f64> = chain
        .iter()
        .filter(|c| c.implied_volatility.is_finite() && c.implied_volatility > 0.0)
        .filter(|c| ((c.strike - spot) / spot).abs() <= ATM_BAND)
        .map(|c| c.implied_volatility)
        .collect();

    let (atm_iv, atm_source) = match atm_hint.filter(|iv| iv.is_finite() && *iv > 0.0) {
        Some(iv) => (iv, AtmSource::Provided),
        None => match mean(&near_money) {
            Some(iv) => (iv, AtmSource::NearMoney),
            None => ((mean_put_iv + mean_call_iv) / 2.0, AtmSource::WingMidpoint),
        },
    };

    let put_skew = (mean_put_iv - atm_iv) / atm_iv;
    let call_skew = (mean_call_iv - atm_iv) / atm_iv;

    let rr_puts = band_ivs(chain, spot, OptionType::Put, RISK_REVERSAL_BAND);
    let rr_calls = band_ivs(chain, spot, OptionType::Call, RISK_REVERSAL_BAND);
    let risk_reversal = match (mean(&rr_puts), mean(&rr_calls)) {
        (Some(p), Some(c)) => Some(p - c),
        _ => None,
    };

    Ok(SkewMetrics {
        atm_iv,
        atm_source,
        mean_put_iv,
        mean_call_iv,
        put_skew,
        call_skew,
        skew_spread: put_skew - call_skew,
        risk_reversal,
        put_count: puts.len(),
        call_count: calls.len(),
    })
}
