pub mod signals;

pub use signals::{AggregatorConfig, Signal, SignalAggregator, SignalSettings};
