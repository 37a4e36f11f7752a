//! Error types for the return anomaly indicator

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Not enough valid prices to form a single return
    #[error("Insufficient data: {valid} valid price(s) after cleaning, need at least {required}")]
    InsufficientData { valid: usize, required: usize },

    /// Detector or report configuration is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A price that has no logarithm
    #[error("Invalid price {price} at {timestamp}: log returns need strictly positive prices")]
    InvalidPrice { timestamp: String, price: f64 },

    /// Timestamps that do not strictly increase
    #[error("Timestamps must strictly increase: {previous} is followed by {current}")]
    Unordered { previous: String, current: String },

    /// Data parsing error
    #[error("Failed to parse data: {0}")]
    Parse(String),

    /// Timestamp text that matches none of the accepted layouts
    #[error("Failed to parse timestamp: {0}")]
    Timestamp(String),

    /// Reference timezone name that the tz database does not know
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Market data provider answered, but not with usable prices
    #[error("Data acquisition failed for {symbol}: {reason}")]
    Acquisition { symbol: String, reason: String },

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if the error comes from talking to the data provider
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(self, Error::Acquisition { .. } | Error::Network(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
