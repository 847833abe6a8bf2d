//! Common error types for services

use thiserror::Error;

/// Market data validation errors
#[derive(Debug, Error)]
pub enum MarketDataError {
    /// Trade rejected at construction
    #[error("Invalid trade: price={price}, size={size}")]
    InvalidTrade {
        /// Offending price
        price: f64,
        /// Offending size
        size: f64,
    },

    /// Exchange name outside the configured pair
    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}")]
    Io {
        /// Path that failed to open
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Required key absent from the file
    #[error("Missing required config key: {0}")]
    MissingKey(String),

    /// Key present but the value does not parse
    #[error("Invalid value for config key {key}: {value}")]
    InvalidValue {
        /// Key being read
        key: String,
        /// Raw value that failed to parse
        value: String,
    },
}

/// Options pricing errors
#[derive(Debug, Error)]
pub enum PricingError {
    /// Inputs outside the model domain
    #[error("Invalid pricing input: {0}")]
    InvalidInput(String),

    /// Implied volatility search failed to converge
    #[error("Implied volatility did not converge after {iterations} iterations")]
    NoConvergence {
        /// Iterations attempted before giving up
        iterations: u32,
    },
}
