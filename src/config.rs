use crate::error::ConfigError;
use crate::services::signals::SignalSettings;
use crate::types::SignalKind;
use std::collections::HashMap;
use std::env;
use tracing::warn;

/// Default qualification floor for aggregate weighting.
const DEFAULT_MIN_CONFIDENCE: f64 = 10.0;
const DEFAULT_SYMBOL: &str = "UNKNOWN";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Enabled signals, in evaluation order.
    pub signals: Vec<SignalKind>,
    /// Weight overrides per signal.
    pub weights: HashMap<SignalKind, f64>,
    /// Historical accuracy (0-100) per signal, from an external backtest.
    pub accuracies: HashMap<SignalKind, f64>,
    /// Results at or below this confidence are excluded from weighting.
    pub min_confidence: f64,
    /// Evaluate signals in parallel.
    pub parallel: bool,
    /// Payload file used when none is given on the command line.
    pub payload_path: Option<String>,
    /// Symbol reported on the output.
    pub symbol: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            signals: SignalKind::ALL.to_vec(),
            weights: HashMap::new(),
            accuracies: HashMap::new(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            parallel: false,
            payload_path: None,
            symbol: DEFAULT_SYMBOL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Invalid values are logged and replaced by their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from environment variables, rejecting invalid values.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::try_from_lookup(|key| env::var(key).ok())
    }

    /// Lenient load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let (config, errors) = Self::parse(lookup);
        for err in errors {
            warn!("{}, using default", err);
        }
        config
    }

    /// Strict load from an arbitrary key lookup.
    pub fn try_from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (config, mut errors) = Self::parse(lookup);
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors.remove(0))
        }
    }

    /// Weight and calibration for one signal.
    pub fn settings_for(&self, kind: SignalKind) -> SignalSettings {
        let weight = self
            .weights
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_weight());
        let settings = SignalSettings::new(weight);
        match self.accuracies.get(&kind) {
            Some(accuracy) => settings.with_historical_accuracy(*accuracy),
            None => settings,
        }
    }

    fn parse<F>(lookup: F) -> (Self, Vec<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();

        // Format: "options_skew,order_flow,trend_regime"
        if let Some(list) = lookup("AUGUR_SIGNALS") {
            let mut signals = Vec::new();
            for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                match SignalKind::from_str(name) {
                    Some(kind) if !signals.contains(&kind) => signals.push(kind),
                    Some(_) => {}
                    None => errors.push(ConfigError::UnknownSignal(name.to_string())),
                }
            }
            if !signals.is_empty() {
                config.signals = signals;
            }
        }

        for kind in SignalKind::ALL {
            let suffix = kind.key().to_uppercase();

            let key = format!("AUGUR_WEIGHT_{}", suffix);
            if let Some(raw) = lookup(&key) {
                match parse_f64(&raw).filter(|w| *w > 0.0 && *w <= 1.0) {
                    Some(weight) => {
                        config.weights.insert(kind, weight);
                    }
                    None => errors.push(invalid(&key, &raw)),
                }
            }

            let key = format!("AUGUR_ACCURACY_{}", suffix);
            if let Some(raw) = lookup(&key) {
                match parse_f64(&raw).filter(|a| (0.0..=100.0).contains(a)) {
                    Some(accuracy) => {
                        config.accuracies.insert(kind, accuracy);
                    }
                    None => errors.push(invalid(&key, &raw)),
                }
            }
        }

        if let Some(raw) = lookup("AUGUR_MIN_CONFIDENCE") {
            match parse_f64(&raw).filter(|c| (0.0..=100.0).contains(c)) {
                Some(min_confidence) => config.min_confidence = min_confidence,
                None => errors.push(invalid("AUGUR_MIN_CONFIDENCE", &raw)),
            }
        }

        if let Some(raw) = lookup("AUGUR_PARALLEL") {
            match parse_bool(&raw) {
                Some(parallel) => config.parallel = parallel,
                None => errors.push(invalid("AUGUR_PARALLEL", &raw)),
            }
        }

        config.payload_path = lookup("AUGUR_PAYLOAD").filter(|p| !p.trim().is_empty());
        if let Some(symbol) = lookup("AUGUR_SYMBOL").filter(|s| !s.trim().is_empty()) {
            config.symbol = symbol.trim().to_uppercase();
        }

        (config, errors)
    }
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
