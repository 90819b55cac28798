//! Centralized Error Handling Module
//!
//! Every request-level failure carries a unique error code so it can be
//! traced in logs and mapped to an HTTP status.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - INVALID_xxx / *_BATCH: request validation (never retried, no upstream calls)
//! - UPSTREAM_xxx: provider failures (normally absorbed by fallback chains)
//! - CONFIG_xxx: configuration errors
//! - API_xxx: HTTP surface errors
//!
//! Ineligible outcomes (too young, no tier match) are NOT errors; they are
//! structured results in `ClassificationResult`.

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Structured details for the response body (e.g. offending batch indices)
    pub details: Option<serde_json::Value>,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Request validation
    // ============================================
    /// Address fails the base58/length check
    InvalidAddressFormat,
    /// One or more batch entries fail the address check
    InvalidBatchAddresses,
    /// Batch with no addresses
    EmptyBatch,
    /// Batch above the configured maximum
    BatchTooLarge,

    // ============================================
    // Upstream providers
    // ============================================
    /// Provider unreachable or every fallback exhausted
    UpstreamUnavailable,
    /// Provider call exceeded its timeout
    UpstreamTimeout,
    /// Provider answered HTTP 429
    UpstreamRateLimited,
    /// Provider answered with an unexpected payload
    UpstreamInvalidResponse,

    // ============================================
    // Configuration
    // ============================================
    /// Tier file or env value failed validation
    ConfigInvalid,
    /// Provider key not configured
    ConfigMissingApiKey,

    // ============================================
    // API
    // ============================================
    ApiBadRequest,
    ApiRateLimited,
    ApiInternalError,

    /// Unknown error
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAddressFormat => "INVALID_ADDRESS_FORMAT",
            Self::InvalidBatchAddresses => "INVALID_BATCH_ADDRESSES",
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::BatchTooLarge => "BATCH_TOO_LARGE",

            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            Self::UpstreamRateLimited => "UPSTREAM_RATE_LIMITED",
            Self::UpstreamInvalidResponse => "UPSTREAM_INVALID_RESPONSE",

            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::ConfigMissingApiKey => "CONFIG_MISSING_API_KEY",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "INTERNAL_ERROR",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidAddressFormat
            | Self::InvalidBatchAddresses
            | Self::EmptyBatch
            | Self::BatchTooLarge
            | Self::ApiBadRequest => 400,
            Self::ApiRateLimited => 429,
            Self::UpstreamUnavailable
            | Self::UpstreamTimeout
            | Self::UpstreamRateLimited
            | Self::UpstreamInvalidResponse => 503,
            _ => 500,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable | Self::UpstreamTimeout | Self::UpstreamRateLimited
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    pub fn invalid_address(address: &str) -> Self {
        Self::new(
            ErrorCode::InvalidAddressFormat,
            format!("Invalid contract address format: {}", address),
        )
    }

    pub fn invalid_batch(indices: Vec<usize>) -> Self {
        Self::new(
            ErrorCode::InvalidBatchAddresses,
            format!(
                "Invalid contract address format at index {}",
                indices
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
        .with_details(serde_json::json!({ "invalid_indices": indices }))
    }

    pub fn empty_batch() -> Self {
        Self::new(
            ErrorCode::EmptyBatch,
            "At least one contract address is required",
        )
    }

    pub fn batch_too_large(max: usize) -> Self {
        Self::new(
            ErrorCode::BatchTooLarge,
            format!(
                "Maximum {} contract addresses allowed per batch request",
                max
            ),
        )
    }

    pub fn upstream_unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamUnavailable, msg)
    }

    pub fn config_invalid(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, msg)
    }

    pub fn missing_api_key(key_name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingApiKey,
            format!("Missing API key: {}", key_name),
        )
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::UpstreamTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::UpstreamUnavailable, "Connection failed")
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::UpstreamInvalidResponse, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::invalid_address("0xnope");
        assert_eq!(err.code, ErrorCode::InvalidAddressFormat);
        assert_eq!(err.code_str(), "INVALID_ADDRESS_FORMAT");
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn test_batch_messages() {
        let err = AppError::batch_too_large(20);
        assert_eq!(
            err.message,
            "Maximum 20 contract addresses allowed per batch request"
        );

        let err = AppError::invalid_batch(vec![0, 3]);
        assert_eq!(err.code, ErrorCode::InvalidBatchAddresses);
        let details = err.details.expect("details attached");
        assert_eq!(details["invalid_indices"], serde_json::json!([0, 3]));
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::UpstreamTimeout.is_retryable());
        assert!(ErrorCode::UpstreamRateLimited.is_retryable());
        assert!(!ErrorCode::InvalidAddressFormat.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::EmptyBatch.http_status(), 400);
        assert_eq!(ErrorCode::UpstreamUnavailable.http_status(), 503);
        assert_eq!(ErrorCode::ConfigInvalid.http_status(), 500);
    }
}
