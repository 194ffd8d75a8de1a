//! Numeric primitives shared by the concrete signals.

pub mod adx;
pub mod bollinger;
pub mod composite;
pub mod flow;
pub mod profile;
pub mod regression;
pub mod skew;

pub use adx::{adx, wilders_smooth, AdxReading};
pub use bollinger::{band_width, BandWidth};
pub use composite::{blend_alt_data, AltComposite, ComponentScore};
pub use flow::{flow_aggression, volume_oi_ratio, FlowMetrics};
pub use profile::{volume_profile, VolumeProfile};
pub use regression::{linear_trend, TrendFit};
pub use skew::{options_skew, AtmSource, SkewMetrics};
