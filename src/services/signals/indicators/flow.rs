//! Options order-flow aggression and block-trade detection.

use crate::types::{OptionContract, OptionType};

/// Volume / open-interest ratio above which a print counts as a block.
pub const BLOCK_RATIO_THRESHOLD: f64 = 0.5;

/// Order-flow statistics for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowMetrics {
    /// Volume-weighted (last - mid) / mid, sign-flipped for puts.
    /// Positive = buyers lifting calls or hitting puts' bids.
    pub aggression: f64,
    /// Volume behind the aggression figure (contracts with usable quotes).
    pub quoted_volume: f64,
    pub call_volume: f64,
    pub put_volume: f64,
    pub total_volume: f64,
    /// Share of total volume in block-like contracts.
    pub block_share: f64,
    pub block_call_volume: f64,
    pub block_put_volume: f64,
}

impl FlowMetrics {
    /// (call - put) / total volume, in [-1, 1].
    pub fn volume_bias(&self) -> f64 {
        if self.total_volume > 0.0 {
            (self.call_volume - self.put_volume) / self.total_volume
        } else {
            0.0
        }
    }

    /// (block call - block put) / block volume, in [-1, 1].
    pub fn block_bias(&self) -> f64 {
        let block_total = self.block_call_volume + self.block_put_volume;
        if block_total > 0.0 {
            (self.block_call_volume - self.block_put_volume) / block_total
        } else {
            0.0
        }
    }
}

/// Volume / open interest, with zero open interest replaced by 1.
pub fn volume_oi_ratio(contract: &OptionContract) -> f64 {
    let oi = if contract.open_interest.is_finite() && contract.open_interest > 0.0 {
        contract.open_interest
    } else {
        1.0
    };
    contract.volume_or_zero() / oi
}

/// Measure aggression and block activity across contracts.
pub fn flow_aggression(contracts: &[OptionContract]) -> FlowMetrics {
    let mut metrics = FlowMetrics::default();
    let mut weighted_aggression = 0.0;

    for contract in contracts {
        let volume = contract.volume_or_zero();
        if volume == 0.0 {
            continue;
        }

        metrics.total_volume += volume;
        match contract.option_type {
            OptionType::Call => metrics.call_volume += volume,
            OptionType::Put => metrics.put_volume += volume,
        }

        if contract.has_quote() && contract.last_price.is_finite() && contract.last_price > 0.0 {
            let mid = contract.mid_price();
            let raw = (contract.last_price - mid) / mid;
            let signed = match contract.option_type {
                OptionType::Call => raw,
                OptionType::Put => -raw,
            };
            weighted_aggression += signed * volume;
            metrics.quoted_volume += volume;
        }

        if volume_oi_ratio(contract) > BLOCK_RATIO_THRESHOLD {
            match contract.option_type {
                OptionType::Call => metrics.block_call_volume += volume,
                OptionType::Put => metrics.block_put_volume += volume,
            }
        }
    }

    if metrics.quoted_volume > 0.0 {
        metrics.aggression = weighted_aggression / metrics.quoted_volume;
    }
    if metrics.total_volume > 0.0 {
        metrics.block_share =
            (metrics.block_call_volume + metrics.block_put_volume) / metrics.total_volume;
    }

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(kind: OptionType, volume: f64, oi: f64, bid: f64, ask: f64, last: f64) -> OptionContract {
        OptionContract::new(kind, 100.0, 0.4)
            .with_activity(volume, oi)
            .with_quote(bid, ask, last)
    }

    #[test]
    fn test_calls_bought_at_ask_are_aggressive() {
        let flow = flow_aggression(&[contract(OptionType::Call, 100.0, 1000.0, 1.0, 1.2, 1.2)]);
        // (1.2 - 1.1) / 1.1
        assert!((flow.aggression - 0.1 / 1.1).abs() < 1e-12);
        assert_eq!(flow.block_share, 0.0);
    }

    #[test]
    fn test_put_aggression_is_sign_flipped() {
        let flow = flow_aggression(&[contract(OptionType::Put, 100.0, 1000.0, 1.0, 1.2, 1.2)]);
        assert!(flow.aggression < 0.0);
    }

    #[test]
    fn test_aggression_is_volume_weighted() {
        let flow = flow_aggression(&[
            contract(OptionType::Call, 300.0, 5000.0, 1.0, 1.2, 1.2),
            contract(OptionType::Call, 100.0, 5000.0, 1.0, 1.2, 1.0),
        ]);
        let expected = (300.0 * (0.1 / 1.1) + 100.0 * (-0.1 / 1.1)) / 400.0;
        assert!((flow.aggression - expected).abs() < 1e-12);
    }

    #[test]
    fn test_block_detection_with_zero_open_interest() {
        let flow = flow_aggression(&[
            contract(OptionType::Call, 50.0, 0.0, 1.0, 1.2, 1.1),
            contract(OptionType::Put, 150.0, 1000.0, 1.0, 1.2, 1.1),
        ]);
        assert_eq!(volume_oi_ratio(&contract(OptionType::Call, 50.0, 0.0, 1.0, 1.2, 1.1)), 50.0);
        assert!((flow.block_share - 0.25).abs() < 1e-12);
        assert_eq!(flow.block_bias(), 1.0);
        assert!((flow.volume_bias() + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unquoted_contracts_skip_aggression() {
        let flow = flow_aggression(&[contract(OptionType::Call, 10.0, 100.0, 0.0, 0.0, 0.5)]);
        assert_eq!(flow.aggression, 0.0);
        assert_eq!(flow.quoted_volume, 0.0);
        assert_eq!(flow.total_volume, 10.0);
    }

    #[test]
    fn test_empty_snapshot() {
        let flow = flow_aggression(&[]);
        assert_eq!(flow, FlowMetrics::default());
        assert_eq!(flow.volume_bias(), 0.0);
    }
}
