//! Centralized Error Handling Module
//!
//! Every failure that can reach a caller carries a unique code so it can be
//! traced in production logs.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - RPC_xxx: Ledger gateway errors
//! - STORE_xxx: Dominance store errors
//! - TOKEN_xxx: Token input / data errors
//! - CFG_xxx: Configuration errors
//!
//! Most of these never escape the core: the gateway degrades to empty data and
//! the dominance store logs and carries on. They exist so that logs stay uniform.

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Ledger RPC Errors
    // ============================================
    /// RPC connection failed
    RpcConnectionFailed,
    /// RPC request timeout
    RpcTimeout,
    /// RPC rate limited (HTTP 429 / -32005)
    RpcRateLimited,
    /// RPC returned error response
    RpcError,
    /// Non-success HTTP status from the RPC endpoint
    RpcInvalidResponse,

    // ============================================
    // Dominance Store Errors
    // ============================================
    /// Mutual exclusion not acquired in time
    StoreLockTimeout,
    /// Durable write failed
    StorePersistenceFailed,
    /// History could not be encoded or decoded
    StoreCorrupt,

    // ============================================
    // Token Errors
    // ============================================
    /// Invalid token address
    TokenInvalidAddress,
    /// Token has no holder data
    TokenNotFound,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            // Ledger RPC Errors
            Self::RpcConnectionFailed => "RPC_CONNECTION_FAILED",
            Self::RpcTimeout => "RPC_TIMEOUT",
            Self::RpcRateLimited => "RPC_RATE_LIMITED",
            Self::RpcError => "RPC_ERROR",
            Self::RpcInvalidResponse => "RPC_INVALID_RESPONSE",

            // Store Errors
            Self::StoreLockTimeout => "STORE_LOCK_TIMEOUT",
            Self::StorePersistenceFailed => "STORE_PERSISTENCE_FAILED",
            Self::StoreCorrupt => "STORE_CORRUPT",

            // Token Errors
            Self::TokenInvalidAddress => "TOKEN_INVALID_ADDRESS",
            Self::TokenNotFound => "TOKEN_NOT_FOUND",

            // Configuration Errors
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::TokenInvalidAddress => 400,
            Self::TokenNotFound => 404,
            Self::RpcRateLimited => 429,
            _ => 500,
        }
    }

    /// Check if repeating the failed operation can help
    ///
    /// Drives the ledger gateway's default retry policy: an explicit JSON-RPC
    /// error is final, everything transient on the RPC path is retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RpcTimeout
                | Self::RpcRateLimited
                | Self::RpcConnectionFailed
                | Self::RpcInvalidResponse
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Invalid token address
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TokenInvalidAddress, msg)
    }

    /// Token not found
    pub fn token_not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TokenNotFound, msg)
    }

    /// Lock not acquired in time
    pub fn lock_timeout(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreLockTimeout, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::StorePersistenceFailed, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::StoreCorrupt, "JSON error", err)
    }
}
