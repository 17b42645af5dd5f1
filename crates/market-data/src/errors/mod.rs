//! Error types and failure classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all marketplace operations
//! - [`FailureClass`]: Classification used by the sync orchestrator to count and
//!   report failures

mod failure;

pub use failure::FailureClass;

use thiserror::Error;

/// Errors that can occur while talking to a marketplace.
///
/// Each variant maps onto a [`FailureClass`] via [`failure_class`](Self::failure_class).
/// Nothing in this crate retries on its own; the class tells the caller whether a
/// later scheduled run is worth it.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The item, product or variant is absent from the marketplace catalog.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The marketplace throttled the request (HTTP 429 or a provider throttle body).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The marketplace that throttled us
        provider: String,
    },

    /// The bearer token was rejected or could not be obtained.
    #[error("Unauthorized: {provider} - {message}")]
    Unauthorized {
        /// The marketplace that rejected the credential
        provider: String,
        /// Detail from the credential source or response
        message: String,
    },

    /// The request timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The marketplace that timed out
        provider: String,
    },

    /// The marketplace answered with a non-success status we don't special-case.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The marketplace that returned the error
        provider: String,
        /// Status line or message from the marketplace
        message: String,
    },

    /// The payload did not match the expected response shape.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The marketplace that sent the payload
        provider: String,
        /// Decoder message
        message: String,
    },

    /// The currency is not offered by this marketplace.
    #[error("Unsupported currency for {provider}: {currency}")]
    UnsupportedCurrency {
        /// The marketplace
        provider: String,
        /// The rejected ISO 4217 code
        currency: String,
    },

    /// A network error occurred before any response was received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use flipledger_market_data::errors::{FailureClass, MarketDataError};
    ///
    /// let error = MarketDataError::RateLimited { provider: "STOCKX".to_string() };
    /// assert_eq!(error.failure_class(), FailureClass::RateLimited);
    ///
    /// let error = MarketDataError::NotFound("DD1391-100".to_string());
    /// assert_eq!(error.failure_class(), FailureClass::NotFound);
    /// ```
    pub fn failure_class(&self) -> FailureClass {
        match self {
            Self::RateLimited { .. } => FailureClass::RateLimited,

            Self::NotFound(_) | Self::UnsupportedCurrency { .. } => FailureClass::NotFound,

            Self::Unauthorized { .. }
            | Self::Timeout { .. }
            | Self::ProviderError { .. }
            | Self::InvalidResponse { .. }
            | Self::Network(_) => FailureClass::Transient,
        }
    }

    /// Shorthand for `failure_class() == FailureClass::RateLimited`.
    pub fn is_rate_limited(&self) -> bool {
        self.failure_class() == FailureClass::RateLimited
    }
}
