//! Volume profile: Point of Control and Value Area.

use crate::types::OhlcPoint;

/// Minimum samples needed to build a profile.
pub const MIN_SAMPLES: usize = 20;
/// Upper bound on histogram bins.
pub const MAX_BINS: usize = 50;
/// Target samples per bin when sizing the histogram.
const SAMPLES_PER_BIN: usize = 2;
/// Share of total volume the value area must capture.
pub const VALUE_AREA_TARGET: f64 = 0.70;

/// Traded volume histogram over price.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeProfile {
    /// Lower edge of the first bin.
    pub price_min: f64,
    pub bin_width: f64,
    /// Volume per bin, lowest price first.
    pub volumes: Vec<f64>,
    pub total_volume: f64,
    /// Index of the highest-volume bin.
    pub poc_index: usize,
    /// Center price of the POC bin.
    pub poc: f64,
    /// Inclusive bin range of the value area.
    pub value_area_bins: (usize, usize),
    /// Lower edge of the lowest value-area bin.
    pub value_area_low: f64,
    /// Upper edge of the highest value-area bin.
    pub value_area_high: f64,
    /// Volume inside the value area.
    pub value_area_volume: f64,
}

impl VolumeProfile {
    pub fn bin_count(&self) -> usize {
        self.volumes.len()
    }

    /// Center price of a bin.
    pub fn bin_center(&self, index: usize) -> f64 {
        self.price_min + (index as f64 + 0.5) * self.bin_width
    }

    /// Share of volume in the POC bin.
    pub fn poc_share(&self) -> f64 {
        self.volumes[self.poc_index] / self.total_volume
    }

    /// Share of volume captured by the value area.
    pub fn value_area_share(&self) -> f64 {
        self.value_area_volume / self.total_volume
    }

    /// Volume in bins strictly above and strictly below the POC.
    pub fn volume_above_below_poc(&self) -> (f64, f64) {
        let below = self.volumes[..self.poc_index].iter().sum();
        let above = self.volumes[self.poc_index + 1..].iter().sum();
        (above, below)
    }

    /// Whether a price lies inside the value area (edges inclusive).
    pub fn in_value_area(&self, price: f64) -> bool {
        price >= self.value_area_low && price <= self.value_area_high
    }
}

/// Number of bins for a sample count: about two samples per bin, capped.
pub fn bin_count_for(samples: usize) -> usize {
    (samples / SAMPLES_PER_BIN).clamp(1, MAX_BINS)
}

/// Build a volume profile from candles using each candle's typical price.
///
/// Returns `None` with fewer than [`MIN_SAMPLES`] candles, non-finite
/// prices, or zero total volume.
pub fn volume_profile(candles: &[OhlcPoint]) -> Option<VolumeProfile> {
    if candles.len() < MIN_SAMPLES {
        return None;
    }

    let samples: Vec<(f64, f64)> = candles
        .iter()
        .map(|c| (c.typical_price(), c.volume_or_zero()))
        .collect();
    if samples.iter().any(|(p, _)| !p.is_finite()) {
        return None;
    }

    let total_volume: f64 = samples.iter().map(|(_, v)| v).sum();
    if total_volume <= 0.0 {
        return None;
    }

    let price_min = samples.iter().map(|(p, _)| *p).fold(f64::INFINITY, f64::min);
    let price_max = samples
        .iter()
        .map(|(p, _)| *p)
        .fold(f64::NEG_INFINITY, f64::max);
    let range = price_max - price_min;

    let bins = if range > 0.0 {
        bin_count_for(samples.len())
    } else {
        1
    };
    let bin_width = if range > 0.0 { range / bins as f64 } else { 0.0 };

    let mut volumes = vec![0.0_f64; bins];
    for (price, volume) in &samples {
        let idx = if bin_width > 0.0 {
            (((price - price_min) / bin_width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        volumes[idx] += volume;
    }

    // First maximum wins, so equal-volume bins resolve to the lower price
    let poc_index = volumes
        .iter()
        .enumerate()
        .fold(0, |best, (i, v)| if *v > volumes[best] { i } else { best });

    let (lo, hi, value_area_volume) = expand_value_area(&volumes, poc_index, total_volume);

    let mut profile = VolumeProfile {
        price_min,
        bin_width,
        poc: price_min,
        value_area_low: price_min + lo as f64 * bin_width,
        // The top bin is closed at the maximum price
        value_area_high: if hi + 1 == bins {
            price_max
        } else {
            price_min + (hi + 1) as f64 * bin_width
        },
        value_area_bins: (lo, hi),
        value_area_volume,
        volumes,
        total_volume,
        poc_index,
    };
    profile.poc = profile.bin_center(poc_index);
    Some(profile)
}

/// Grow the value area outward from the POC.
///
/// Each step claims the larger of the two adjacent unclaimed bins; on a tie
/// the lower-price (left) bin is taken. Stops once the captured volume
/// reaches [`VALUE_AREA_TARGET`] of the total or both edges are reached.
fn expand_value_area(volumes: &[f64], poc_index: usize, total_volume: f64) -> (usize, usize, f64) {
    let target = total_volume * VALUE_AREA_TARGET;
    let (mut lo, mut hi) = (poc_index, poc_index);
    let mut captured = volumes[poc_index];

    while captured < target {
        let left = (lo > 0).then(|| volumes[lo - 1]);
        let right = (hi + 1 < volumes.len()).then(|| volumes[hi + 1]);

        match (left, right) {
            (Some(l), Some(r)) if l >= r => {
                lo -= 1;
                captured += l;
            }
            (_, Some(r)) => {
                hi += 1;
                captured += r;
            }
            (Some(l), None) => {
                lo -= 1;
                captured += l;
            }
            (None, None) => break,
        }
    }

    (lo, hi, captured)
}
