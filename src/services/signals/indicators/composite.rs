//! Blended alternative-data composite.
//!
//! Each component is mapped to a score in [-100, +100] and the composite is a
//! weighted mean over whichever components are present.

use crate::types::{AltDataBundle, DerivativesPositioning, NewsSentiment, OnChainMetrics};

const NEWS_WEIGHT: f64 = 0.35;
const DERIVATIVES_WEIGHT: f64 = 0.30;
const ON_CHAIN_WEIGHT: f64 = 0.20;
const MACRO_WEIGHT: f64 = 0.15;

/// Articles needed before news sentiment counts at full strength.
const FULL_NEWS_COVERAGE: f64 = 3.0;
/// Funding rate treated as fully crowded (0.1% per interval).
const CROWDED_FUNDING: f64 = 0.001;
/// Open-interest change (percent) at which conviction saturates.
const FULL_OI_CHANGE: f64 = 20.0;
/// Largest boost or cut open-interest change applies to positioning.
const OI_CONVICTION: f64 = 0.25;

/// One scored alt-data component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentScore {
    pub name: &'static str,
    pub score: f64,
    pub weight: f64,
}

/// Blended composite.
#[derive(Debug, Clone, PartialEq)]
pub struct AltComposite {
    pub score: f64,
    pub components: Vec<ComponentScore>,
}

impl AltComposite {
    /// Whether every present component points the same way (ignoring zeros).
    pub fn components_agree(&self) -> bool {
        let positive = self.components.iter().filter(|c| c.score > 0.0).count();
        let negative = self.components.iter().filter(|c| c.score < 0.0).count();
        self.components.len() >= 2 && (positive == 0 || negative == 0) && positive + negative >= 2
    }
}

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// News sentiment, dampened when few articles back it.
pub fn news_score(news: &NewsSentiment) -> f64 {
    let coverage = (news.article_count as f64 / FULL_NEWS_COVERAGE).min(1.0);
    unit(news.score) * coverage * 100.0
}

/// Contrarian read of derivatives positioning: crowded longs are bearish.
///
/// Rising open interest means fresh positions behind the crowding and
/// strengthens the read; falling open interest means it is unwinding.
pub fn derivatives_score(positioning: &DerivativesPositioning) -> f64 {
    let funding = unit(-positioning.funding_rate / CROWDED_FUNDING);
    let crowding = unit(-(positioning.long_short_ratio - 1.0));
    let conviction =
        1.0 + OI_CONVICTION * unit(positioning.open_interest_change_pct / FULL_OI_CHANGE);
    ((0.6 * funding + 0.4 * crowding) * conviction * 100.0).clamp(-100.0, 100.0)
}

/// Coins leaving exchanges and a growing user base are bullish.
pub fn on_chain_score(metrics: &OnChainMetrics) -> f64 {
    let netflow = unit(-metrics.exchange_netflow_z / 2.0);
    let activity = unit(metrics.active_addresses_change_pct / 10.0);
    (0.6 * netflow + 0.4 * activity) * 100.0
}

/// Blend the components present in a bundle.
///
/// Returns `None` when the bundle has no usable component.
pub fn blend_alt_data(bundle: &AltDataBundle) -> Option<AltComposite> {
    let mut components = Vec::with_capacity(4);

    if let Some(news) = &bundle.news {
        components.push(ComponentScore {
            name: "news",
            score: news_score(news),
            weight: NEWS_WEIGHT,
        });
    }
    if let Some(positioning) = &bundle.derivatives {
        components.push(ComponentScore {
            name: "derivatives",
            score: derivatives_score(positioning),
            weight: DERIVATIVES_WEIGHT,
        });
    }
    if let Some(metrics) = &bundle.on_chain {
        components.push(ComponentScore {
            name: "on_chain",
            score: on_chain_score(metrics),
            weight: ON_CHAIN_WEIGHT,
        });
    }
    if let Some(macro_score) = bundle.macro_score.filter(|m| m.is_finite()) {
        components.push(ComponentScore {
            name: "macro",
            score: unit(macro_score) * 100.0,
            weight: MACRO_WEIGHT,
        });
    }

    if components.is_empty() {
        return None;
    }

    let total_weight: f64 = components.iter().map(|c| c.weight).sum();
    let score = components.iter().map(|c| c.score * c.weight).sum::<f64>() / total_weight;

    Some(AltComposite { score, components })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_dampened_by_coverage() {
        let thin = NewsSentiment {
            score: 0.6,
            article_count: 1,
        };
        let full = NewsSentiment {
            score: 0.6,
            article_count: 10,
        };
        assert!((news_score(&thin) - 20.0).abs() < 1e-9);
        assert!((news_score(&full) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_crowded_longs_are_bearish() {
        let crowded = DerivativesPositioning {
            funding_rate: 0.002,
            long_short_ratio: 2.5,
            open_interest_change_pct: 12.0,
        };
        assert!((derivatives_score(&crowded) + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_open_interest_scales_positioning() {
        let positioning = |oi_change: f64| DerivativesPositioning {
            funding_rate: 0.0005,
            long_short_ratio: 1.0,
            open_interest_change_pct: oi_change,
        };
        // 0.6 * -0.5 = -30 before open interest
        assert!((derivatives_score(&positioning(0.0)) + 30.0).abs() < 1e-9);
        assert!((derivatives_score(&positioning(10.0)) + 33.75).abs() < 1e-9);
        assert!((derivatives_score(&positioning(-40.0)) + 22.5).abs() < 1e-9);
        assert!((derivatives_score(&positioning(f64::NAN)) + 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_outflows_are_bullish() {
        let metrics = OnChainMetrics {
            exchange_netflow_z: -2.0,
            active_addresses_change_pct: 5.0,
        };
        // 0.6 * 1.0 + 0.4 * 0.5
        assert!((on_chain_score(&metrics) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_blend_renormalizes_weights() {
        let bundle = AltDataBundle {
            news: Some(NewsSentiment {
                score: 0.5,
                article_count: 5,
            }),
            macro_score: Some(-0.2),
            ..Default::default()
        };
        let composite = blend_alt_data(&bundle).unwrap();
        let expected = (50.0 * 0.35 + -20.0 * 0.15) / 0.50;
        assert!((composite.score - expected).abs() < 1e-9);
        assert!(!composite.components_agree());
    }

    #[test]
    fn test_empty_bundle() {
        assert!(blend_alt_data(&AltDataBundle::default()).is_none());
    }

    #[test]
    fn test_agreement_needs_two_signed_components() {
        let bundle = AltDataBundle {
            news: Some(NewsSentiment {
                score: 0.5,
                article_count: 5,
            }),
            macro_score: Some(0.4),
            ..Default::default()
        };
        assert!(blend_alt_data(&bundle).unwrap().components_agree());

        let single = AltDataBundle {
            macro_score: Some(0.4),
            ..Default::default()
        };
        assert!(!blend_alt_data(&single).unwrap().components_agree());
    }
}
