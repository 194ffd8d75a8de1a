use thiserror::Error;

/// Signal evaluation errors.
///
/// None of these are fatal to an aggregate run: the aggregator resolves every
/// variant into a neutral, zero-confidence result for the failing signal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    /// A required payload field is absent or null.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Data is present and well-typed but too thin or degenerate to use.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Unexpected failure inside a signal's math.
    #[error("Computation error: {0}")]
    Computation(String),
}

impl SignalError {
    /// Whether this error reflects data quality rather than a defect.
    pub fn is_data_quality(&self) -> bool {
        matches!(
            self,
            SignalError::MissingData(_) | SignalError::InsufficientData(_)
        )
    }
}

/// Configuration parsing errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown signal: {0}")]
    UnknownSignal(String),
}

pub type Result<T> = std::result::Result<T, SignalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_quality_classification() {
        assert!(SignalError::MissingData("alt_data".into()).is_data_quality());
        assert!(SignalError::InsufficientData("empty".into()).is_data_quality());
        assert!(!SignalError::Computation("nan".into()).is_data_quality());
    }

    #[test]
    fn test_error_display() {
        let err = SignalError::InsufficientData("need 20 candles, got 3".into());
        assert_eq!(err.to_string(), "Insufficient data: need 20 candles, got 3");

        let err = ConfigError::InvalidValue {
            key: "AUGUR_PARALLEL".into(),
            value: "maybe".into(),
        };
        assert_eq!(err.to_string(), "Invalid value for AUGUR_PARALLEL: maybe");
    }
}
