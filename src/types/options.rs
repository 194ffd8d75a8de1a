use serde::{Deserialize, Serialize};

/// Option type (Call or Put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    /// Right to buy at strike price
    Call,
    /// Right to sell at strike price
    Put,
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

/// A row of an options chain or order-flow snapshot.
///
/// Field names match the tabular exports produced by the data layer
/// (`type`, `impliedVolatility`, `openInterest`, `lastPrice`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    /// Option type (call or put)
    #[serde(rename = "type")]
    pub option_type: OptionType,
    /// Strike price
    pub strike: f64,
    /// Implied volatility (as decimal, e.g., 0.25 = 25%)
    #[serde(default)]
    pub implied_volatility: f64,
    /// Session volume
    #[serde(default)]
    pub volume: f64,
    /// Open interest
    #[serde(default)]
    pub open_interest: f64,
    /// Current bid price
    #[serde(default)]
    pub bid: f64,
    /// Current ask price
    #[serde(default)]
    pub ask: f64,
    /// Last trade price
    #[serde(default)]
    pub last_price: f64,
}

impl OptionContract {
    /// Create a contract with only type, strike and IV set.
    pub fn new(option_type: OptionType, strike: f64, implied_volatility: f64) -> Self {
        Self {
            option_type,
            strike,
            implied_volatility,
            volume: 0.0,
            open_interest: 0.0,
            bid: 0.0,
            ask: 0.0,
            last_price: 0.0,
        }
    }

    /// Set volume and open interest.
    pub fn with_activity(mut self, volume: f64, open_interest: f64) -> Self {
        self.volume = volume;
        self.open_interest = open_interest;
        self
    }

    /// Set bid, ask and last trade price.
    pub fn with_quote(mut self, bid: f64, ask: f64, last_price: f64) -> Self {
        self.bid = bid;
        self.ask = ask;
        self.last_price = last_price;
        self
    }

    /// Get the mid price (average of bid and ask).
    pub fn mid_price(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Whether bid/ask form a usable quote.
    pub fn has_quote(&self) -> bool {
        self.bid.is_finite() && self.ask.is_finite() && self.bid > 0.0 && self.ask >= self.bid
    }

    /// Distance out of the money as a fraction of spot.
    ///
    /// Positive when OTM (call strike above spot, put strike below spot),
    /// negative when in the money.
    pub fn otm_fraction(&self, spot: f64) -> f64 {
        match self.option_type {
            OptionType::Call => (self.strike - spot) / spot,
            OptionType::Put => (spot - self.strike) / spot,
        }
    }

    /// Volume, treating non-finite or negative values as zero.
    pub fn volume_or_zero(&self) -> f64 {
        if self.volume.is_finite() && self.volume > 0.0 {
            self.volume
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otm_fraction() {
        let call = OptionContract::new(OptionType::Call, 110.0, 0.5);
        let put = OptionContract::new(OptionType::Put, 90.0, 0.3);
        assert!((call.otm_fraction(100.0) - 0.10).abs() < 1e-12);
        assert!((put.otm_fraction(100.0) - 0.10).abs() < 1e-12);

        let itm_call = OptionContract::new(OptionType::Call, 95.0, 0.4);
        assert!(itm_call.otm_fraction(100.0) < 0.0);
    }

    #[test]
    fn test_mid_and_quote() {
        let c = OptionContract::new(OptionType::Call, 100.0, 0.4).with_quote(1.0, 1.2, 1.15);
        assert!((c.mid_price() - 1.1).abs() < 1e-12);
        assert!(c.has_quote());

        let crossed = OptionContract::new(OptionType::Put, 100.0, 0.4).with_quote(1.2, 1.0, 1.1);
        assert!(!crossed.has_quote());
    }

    #[test]
    fn test_deserialize_table_row() {
        let json = r#"{
            "type": "put",
            "strike": 95.0,
            "impliedVolatility": 0.42,
            "volume": 1200,
            "openInterest": 800,
            "bid": 2.1,
            "ask": 2.3,
            "lastPrice": 2.25
        }"#;
        let c: OptionContract = serde_json::from_str(json).unwrap();
        assert_eq!(c.option_type, OptionType::Put);
        assert_eq!(c.volume, 1200.0);
        assert_eq!(c.open_interest, 800.0);
        assert_eq!(c.last_price, 2.25);
    }
}
