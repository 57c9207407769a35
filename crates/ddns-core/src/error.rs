//! Error types for the DDNS updater
//!
//! A single error enum is shared by the core, the IP resolver and the
//! record directory so the scheduler can decide policy from one type.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// Public IP lookup failed (transient, the cycle is skipped)
    #[error("IP source error: {0}")]
    IpSource(String),

    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication or permission errors from the provider
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Zone or record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether the scheduler may skip the cycle and keep running.
    ///
    /// Only IP lookup failures are recoverable; everything else ends the process.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::IpSource(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_ip_source_errors_are_transient() {
        assert!(Error::ip_source("timeout").is_transient());
        assert!(!Error::config("missing").is_transient());
        assert!(!Error::provider("cloudflare", "boom").is_transient());
        assert!(!Error::not_found("zone").is_transient());
    }

    #[test]
    fn test_provider_error_display() {
        let err = Error::provider("cloudflare", "HTTP request failed");
        assert_eq!(
            err.to_string(),
            "Provider error (cloudflare): HTTP request failed"
        );
    }
}
