//! Error types for the CRM sync layer.
//!
//! This module defines custom error types using `thiserror` for precise error handling.
//! Provider errors are propagated from single-target operations and swallowed by the
//! multi-source search path.

use thiserror::Error;

/// Errors that can occur when interacting with a CRM provider API.
#[derive(Error, Debug)]
pub enum CrmError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Authentication failed
    #[error("Authentication failed")]
    Unauthorized,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The refresh-token exchange was rejected or could not be completed
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// The credential needs a refresh but carries no refresh token
    #[error("Credential {0} has no refresh token")]
    MissingRefreshToken(String),

    /// Credential persistence failed
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),

    /// Generic API error with context
    #[error("API error: {0}")]
    Other(String),
}

/// Errors from the AI text-completion service.
#[derive(Error, Debug)]
pub enum AiError {
    /// HTTP request failed
    #[error("AI request failed: {0}")]
    HttpError(String),

    /// The service answered with a non-success status
    #[error("AI service error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The service answered but produced no text
    #[error("AI service returned an empty response")]
    EmptyResponse,

    /// No API key configured
    #[error("AI service API key is not configured")]
    MissingApiKey,
}

/// Outcomes of parsing an AI extraction response that yield no drafts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The body is not parseable JSON
    #[error("invalid_json")]
    InvalidJson,

    /// The body is JSON but not an array
    #[error("invalid_format")]
    InvalidFormat,
}

/// Errors surfaced by the suggestion flow.
///
/// The variants keep "AI extraction failed" and "write to provider failed"
/// apart so callers can render distinct states. "Nothing found" is not an
/// error: it is an `Ok` with an empty suggestion list.
#[derive(Error, Debug)]
pub enum SuggestionError {
    /// The baseline contact could not be fetched
    #[error("Failed to fetch contact: {0}")]
    ContactFetch(#[source] CrmError),

    /// The AI service call failed
    #[error("AI extraction failed: {0}")]
    Extraction(#[from] AiError),

    /// The AI response could not be interpreted
    #[error("AI response could not be parsed: {0}")]
    Parse(#[from] ParseError),

    /// Writing the selected updates to the provider failed
    #[error("Failed to update contact: {0}")]
    Update(#[source] CrmError),

    /// No suggestion was selected for application
    #[error("No suggestions selected")]
    NothingSelected,
}

/// Errors raised by the reference credential / contact stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file holds invalid JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Other(String),
}

/// Convenience type alias for Results with CrmError
pub type CrmResult<T> = Result<T, CrmError>;

/// Convenience type alias for Results with AiError
pub type AiResult<T> = Result<T, AiError>;

/// Convenience type alias for Results with SuggestionError
pub type SuggestionResult<T> = Result<T, SuggestionError>;

/// Convenience type alias for Results with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
