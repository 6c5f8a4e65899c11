//! Ledger Gateway - resilient Solana JSON-RPC client
//!
//! One reusable call path for every ledger query:
//! 1. JSON-RPC 2.0 envelope with a monotonically increasing id
//! 2. Shared concurrency limiter (semaphore) held for the whole call
//! 3. Injectable retry policy: exponential backoff for transport failures,
//!    linear backoff for rate limiting, no retry for explicit RPC errors
//! 4. Gzip + User-Agent on the HTTP transport
//!
//! Exhausted retries yield `Value::Null`. Callers treat that as "no data".

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, USER_AGENT};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::solana::{LargestAccount, MintInfo, RpcValue, SignatureInfo, SolanaTransaction, TokenAmount};
use crate::models::config::{RetryPolicy, ScopeConfig};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{RPC_RATE_LIMIT_CODE, USER_AGENT as USER_AGENT_CONST};

/// JSON-RPC error structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl RpcError {
    /// Check if this is a rate limit error (429 / -32005 or a throttling message)
    pub fn is_rate_limit(&self) -> bool {
        let message = self.message.to_lowercase();
        self.code == 429
            || self.code == RPC_RATE_LIMIT_CODE
            || message.contains("429")
            || message.contains("rate limit")
    }
}

/// Why a single attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallFailure {
    /// HTTP 429 or a throttling JSON-RPC error
    RateLimited,
    /// Explicit JSON-RPC error response
    Rpc(RpcError),
    /// Request exceeded the transport timeout
    Timeout,
    /// Connection or body decode failure
    Transport(String),
    /// Non-success HTTP status
    Http(u16),
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate limited"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Rpc(err) => write!(f, "RPC error: {} (code: {})", err.message, err.code),
            Self::Transport(msg) => write!(f, "transport: {}", msg),
            Self::Http(status) => write!(f, "HTTP error: {}", status),
        }
    }
}

impl CallFailure {
    /// Error code this failure is reported under
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RateLimited => ErrorCode::RpcRateLimited,
            Self::Timeout => ErrorCode::RpcTimeout,
            Self::Rpc(_) => ErrorCode::RpcError,
            Self::Transport(_) => ErrorCode::RpcConnectionFailed,
            Self::Http(_) => ErrorCode::RpcInvalidResponse,
        }
    }
}

impl From<CallFailure> for AppError {
    fn from(failure: CallFailure) -> Self {
        AppError::new(failure.code(), failure.to_string())
    }
}

/// Sends one JSON-RPC envelope and returns the raw response envelope
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    async fn send(&self, payload: Value) -> Result<Value, CallFailure>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| AppError::with_source(ErrorCode::ConfigInvalidValue, "Cannot build RPC HTTP client", e))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl LedgerTransport for HttpTransport {
    async fn send(&self, payload: Value) -> Result<Value, CallFailure> {
        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CallFailure::Timeout
                } else {
                    CallFailure::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(CallFailure::RateLimited);
        }
        if !status.is_success() {
            return Err(CallFailure::Http(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CallFailure::Transport(format!("Failed to parse response: {}", e)))
    }
}

/// Pull `result` out of a response envelope, classifying any `error` member
fn interpret_envelope(envelope: Value) -> Result<Value, CallFailure> {
    if let Some(error) = envelope.get("error").filter(|e| !e.is_null()) {
        let error: RpcError = serde_json::from_value(error.clone()).unwrap_or(RpcError {
            code: 0,
            message: error.to_string(),
        });
        if error.is_rate_limit() {
            return Err(CallFailure::RateLimited);
        }
        return Err(CallFailure::Rpc(error));
    }
    Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
}

/// Shared ledger client
pub struct LedgerGateway {
    transport: Arc<dyn LedgerTransport>,
    limiter: Semaphore,
    retry: RetryPolicy,
    next_id: AtomicU64,
}

impl LedgerGateway {
    pub fn new(transport: Arc<dyn LedgerTransport>, concurrency_limit: usize, retry: RetryPolicy) -> Self {
        Self {
            transport,
            limiter: Semaphore::new(concurrency_limit.max(1)),
            retry,
            next_id: AtomicU64::new(1),
        }
    }

    /// Gateway over HTTP using the configured endpoint, limit and policy
    pub fn from_config(config: &ScopeConfig) -> AppResult<Self> {
        let transport = HttpTransport::new(config.rpc_url.clone(), config.rpc_timeout)?;
        Ok(Self::new(Arc::new(transport), config.concurrency_limit, config.retry))
    }

    /// Execute a JSON-RPC call. Returns `Value::Null` when no data could be had.
    pub async fn call(&self, method: &str, params: Value) -> Value {
        let Ok(_permit) = self.limiter.acquire().await else {
            return Value::Null;
        };

        let payload = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });

        let max_attempts = self.retry.max_attempts.max(1);
        for attempt in 0..max_attempts {
            let failure = match self.transport.send(payload.clone()).await.and_then(interpret_envelope) {
                Ok(result) => return result,
                Err(failure) => failure,
            };

            if !(self.retry.retryable)(&failure) {
                debug!("❌ {} failed without retry: {}", method, AppError::from(failure));
                return Value::Null;
            }
            if attempt + 1 == max_attempts {
                warn!("⚠️ {} gave up after {} attempts: {}", method, max_attempts, AppError::from(failure));
                break;
            }

            let delay = match failure {
                CallFailure::RateLimited => {
                    warn!("⏳ Rate limited on {}, backing off (attempt {}/{})", method, attempt + 1, max_attempts);
                    self.retry.rate_limit_backoff(attempt)
                }
                _ => {
                    debug!("⏳ Retry {}/{} for {} after {:?}: {}", attempt + 1, max_attempts, method, self.retry.backoff(attempt), failure);
                    self.retry.backoff(attempt)
                }
            };
            tokio::time::sleep(delay).await;
        }

        Value::Null
    }

    /// Decode `result.value` into `T`, if present and well-formed
    async fn call_value<T: for<'de> Deserialize<'de>>(&self, method: &str, params: Value) -> Option<T> {
        let result = self.call(method, params).await;
        serde_json::from_value::<RpcValue<T>>(result).ok().map(|v| v.value)
    }

    /// Total supply of a mint
    pub async fn get_token_supply(&self, mint: &str) -> Option<TokenAmount> {
        self.call_value("getTokenSupply", json!([mint])).await
    }

    /// Largest token accounts of a mint, largest first
    pub async fn get_token_largest_accounts(&self, mint: &str) -> Vec<LargestAccount> {
        self.call_value("getTokenLargestAccounts", json!([mint]))
            .await
            .unwrap_or_default()
    }

    /// Recent signatures for an address, newest first
    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
        commitment: Option<&str>,
    ) -> Vec<SignatureInfo> {
        let mut options = json!({ "limit": limit });
        if let Some(commitment) = commitment {
            options["commitment"] = json!(commitment);
        }
        let result = self.call("getSignaturesForAddress", json!([address, options])).await;
        serde_json::from_value(result).unwrap_or_default()
    }

    /// Parsed transaction by signature
    pub async fn get_transaction(&self, signature: &str) -> Option<SolanaTransaction> {
        let result = self
            .call(
                "getTransaction",
                json!([signature, { "encoding": "jsonParsed", "maxSupportedTransactionVersion": 0 }]),
            )
            .await;
        if result.is_null() {
            return None;
        }
        serde_json::from_value(result).ok()
    }

    /// Parsed mint account (decimals and authorities)
    pub async fn get_account_info(&self, mint: &str) -> MintInfo {
        let result = self
            .call("getAccountInfo", json!([mint, { "encoding": "jsonParsed" }]))
            .await;
        MintInfo::from_account_result(&result)
    }
}
