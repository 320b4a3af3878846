//! Error types for single-sign-on strategy operations.
//!
//! This module defines the error types that can occur when authenticating
//! against an identity provider (Google, Facebook, etc.).

use std::fmt;
use thiserror::Error;

/// The category of a strategy error.
///
/// This enum provides a high-level classification of errors for use in
/// framework responses and retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyErrorCode {
    /// No usable access credential could be resolved from the supplied
    /// parameters, or identity-token verification failed.
    AuthenticationFailed,
    /// Network error - connection failed, timeout, DNS resolution, etc.
    NetworkError,
    /// Rate limit exceeded - too many requests.
    RateLimited,
    /// Provider returned an error (5xx status codes).
    ServerError,
    /// Invalid response from the provider - parse error, unexpected format.
    InvalidResponse,
    /// Required settings missing or credential forms unresolved; raised at
    /// construction, before any network activity.
    ConfigurationError,
    /// The contact feed kept producing "next" links past the configured
    /// page ceiling.
    PaginationLimitExceeded,
    /// Internal strategy error - unexpected state, bug.
    InternalError,
}

impl StrategyErrorCode {
    /// Returns true if this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::ConfigurationError => "configuration_error",
            Self::PaginationLimitExceeded => "pagination_limit_exceeded",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for StrategyErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while running a single-sign-on strategy.
#[derive(Debug, Error)]
pub struct StrategyError {
    /// The error code categorizing this error.
    code: StrategyErrorCode,
    /// A human-readable message describing the error.
    message: String,
    /// The provider that generated this error (e.g., "google").
    provider: Option<String>,
    /// The underlying cause of this error, if any.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StrategyError {
    /// Creates a new strategy error with the given code and message.
    pub fn new(code: StrategyErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(StrategyErrorCode::AuthenticationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(StrategyErrorCode::NetworkError, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(StrategyErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(StrategyErrorCode::ServerError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(StrategyErrorCode::InvalidResponse, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(StrategyErrorCode::ConfigurationError, message)
    }

    /// Creates a pagination limit error.
    pub fn pagination_limit(message: impl Into<String>) -> Self {
        Self::new(StrategyErrorCode::PaginationLimitExceeded, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StrategyErrorCode::InternalError, message)
    }

    /// Sets the provider name for this error.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> StrategyErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for strategy operations.
pub type StrategyResult<T> = Result<T, StrategyError>;
