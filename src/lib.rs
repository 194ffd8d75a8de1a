//! Augur - Directional bias engine for options and crypto markets

pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{ConfigError, SignalError};
pub use services::signals::{evaluate_signal, Signal, SignalAggregator};
pub use types::*;
