//! Input payload handed to every signal.
//!
//! Every field is optional; each signal declares which ones it needs through
//! [`PayloadField`] and the aggregator checks them before dispatch.

use super::{OhlcPoint, OptionContract};
use serde::{Deserialize, Serialize};

/// Named payload fields a signal can depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadField {
    CurrentPrice,
    PriceHistory,
    OptionsChain,
    OrderFlow,
    VolumeStats,
    RecentPriceChange,
    AtmIv,
    AltData,
}

impl PayloadField {
    /// Field key as it appears in the serialized payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadField::CurrentPrice => "current_price",
            PayloadField::PriceHistory => "price_history",
            PayloadField::OptionsChain => "options_chain",
            PayloadField::OrderFlow => "order_flow",
            PayloadField::VolumeStats => "volume_stats",
            PayloadField::RecentPriceChange => "recent_price_change",
            PayloadField::AtmIv => "atm_iv",
            PayloadField::AltData => "alt_data",
        }
    }
}

impl std::fmt::Display for PayloadField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Historical option volume statistics for unusual-activity detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolumeStats {
    pub avg_call_volume: f64,
    pub std_call_volume: f64,
    pub avg_put_volume: f64,
    pub std_put_volume: f64,
}

/// Aggregated news sentiment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NewsSentiment {
    /// Mean sentiment from -1.0 (very negative) to +1.0 (very positive).
    pub score: f64,
    /// Number of articles behind the score.
    #[serde(default)]
    pub article_count: u32,
}

/// Derivatives market positioning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DerivativesPositioning {
    /// Funding rate per interval as a decimal (0.0001 = 0.01%).
    pub funding_rate: f64,
    /// Long accounts divided by short accounts.
    pub long_short_ratio: f64,
    /// Open interest change over the lookback, in percent.
    #[serde(default)]
    pub open_interest_change_pct: f64,
}

/// On-chain flow proxies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OnChainMetrics {
    /// Z-score of net exchange inflow (positive = coins moving to exchanges).
    pub exchange_netflow_z: f64,
    /// Change in active addresses, in percent.
    pub active_addresses_change_pct: f64,
}

/// Blended alternative-data bundle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AltDataBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news: Option<NewsSentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivatives: Option<DerivativesPositioning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_chain: Option<OnChainMetrics>,
    /// Macro risk appetite from -1.0 (risk-off) to +1.0 (risk-on).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macro_score: Option<f64>,
}

impl AltDataBundle {
    /// Whether no component is populated.
    pub fn is_empty(&self) -> bool {
        self.news.is_none()
            && self.derivatives.is_none()
            && self.on_chain.is_none()
            && self.macro_score.is_none()
    }
}

/// Already-fetched market data for one symbol.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_history: Option<Vec<OhlcPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options_chain: Option<Vec<OptionContract>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_flow: Option<Vec<OptionContract>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_stats: Option<VolumeStats>,
    /// Recent price change in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_price_change: Option<f64>,
    /// At-the-money implied volatility, when the data layer already knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atm_iv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_data: Option<AltDataBundle>,
}

impl SignalPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a field is present and not null.
    ///
    /// Non-finite scalars count as null. Empty tables count as present:
    /// emptiness is a data-quality concern for the signal, not a schema one.
    pub fn has(&self, field: PayloadField) -> bool {
        match field {
            PayloadField::CurrentPrice => is_finite(self.current_price),
            PayloadField::PriceHistory => self.price_history.is_some(),
            PayloadField::OptionsChain => self.options_chain.is_some(),
            PayloadField::OrderFlow => self.order_flow.is_some(),
            PayloadField::VolumeStats => self.volume_stats.is_some(),
            PayloadField::RecentPriceChange => is_finite(self.recent_price_change),
            PayloadField::AtmIv => is_finite(self.atm_iv),
            PayloadField::AltData => self.alt_data.is_some(),
        }
    }

    /// Required fields that are absent or null, in declaration order.
    pub fn missing(&self, required: &[PayloadField]) -> Vec<PayloadField> {
        required.iter().copied().filter(|f| !self.has(*f)).collect()
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn with_price_history(mut self, candles: Vec<OhlcPoint>) -> Self {
        self.price_history = Some(candles);
        self
    }

    pub fn with_options_chain(mut self, chain: Vec<OptionContract>) -> Self {
        self.options_chain = Some(chain);
        self
    }

    pub fn with_order_flow(mut self, flow: Vec<OptionContract>) -> Self {
        self.order_flow = Some(flow);
        self
    }

    pub fn with_volume_stats(mut self, stats: VolumeStats) -> Self {
        self.volume_stats = Some(stats);
        self
    }

    pub fn with_recent_price_change(mut self, change_pct: f64) -> Self {
        self.recent_price_change = Some(change_pct);
        self
    }

    pub fn with_atm_iv(mut self, iv: f64) -> Self {
        self.atm_iv = Some(iv);
        self
    }

    pub fn with_alt_data(mut self, bundle: AltDataBundle) -> Self {
        self.alt_data = Some(bundle);
        self
    }
}

fn is_finite(value: Option<f64>) -> bool {
    value.map(f64::is_finite).unwrap_or(false)
}
