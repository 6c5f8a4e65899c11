//! Configuration module for RugScope
//!
//! Uses constants from utils/constants.rs. Environment variables override the
//! endpoints and the store location; every heuristic threshold is a field so it
//! can be tuned without touching the engines.

use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::providers::rpc::CallFailure;
use crate::utils::constants::{
    build_helius_url, BUNDLE_MIN_SIZE, DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_STORE_DIR,
    DEXSCREENER_API_BASE, DEXSCREENER_TIMEOUT_SECS, DOMINANCE_HISTORY_LIMIT,
    DOMINANCE_LOCK_POLL_MS, DOMINANCE_LOCK_TIMEOUT_SECS, FLOW_INSPECT_DEPTH,
    FLOW_SIGNATURE_LIMIT, FUNDING_SIGNATURE_LIMIT, PUBLIC_SOLANA_RPC, RPC_BASE_BACKOFF_MS,
    RPC_CONCURRENCY_LIMIT, RPC_MAX_ATTEMPTS, RPC_RATE_LIMIT_STEP_MS, STRONG_FLOW_PERCENT,
    WHALE_SAMPLE_SIZE,
};

/// Retry policy for ledger calls
///
/// Attempt numbers are zero-based: the first retry after attempt 0 waits
/// `base_delay`, the next `2 × base_delay`. A rate-limited response waits
/// `rate_limit_step × (attempt + 1)` instead.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub rate_limit_step: Duration,
    /// Decides whether a failed attempt is worth repeating
    pub retryable: fn(&CallFailure) -> bool,
}

impl RetryPolicy {
    /// Delay after a transport failure on `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Delay after a rate-limit response on `attempt`
    pub fn rate_limit_backoff(&self, attempt: u32) -> Duration {
        self.rate_limit_step.saturating_mul(attempt + 1)
    }

    /// Same attempt budget, no sleeping. Used by tests and replay tools.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            rate_limit_step: Duration::ZERO,
            retryable: default_retryable,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: RPC_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(RPC_BASE_BACKOFF_MS),
            rate_limit_step: Duration::from_millis(RPC_RATE_LIMIT_STEP_MS),
            retryable: default_retryable,
        }
    }
}

/// Rate limits, timeouts and transport failures are retried; an explicit
/// JSON-RPC error (bad params, unknown account) will not improve by asking again.
pub fn default_retryable(failure: &CallFailure) -> bool {
    failure.code().is_retryable()
}

/// Whale flow & funding-trace tunables
#[derive(Debug, Clone)]
pub struct WhaleConfig {
    /// Top holders sampled
    pub sample_size: usize,
    /// Recent signatures fetched per wallet for flow
    pub flow_signature_limit: usize,
    /// Transactions inspected per wallet for flow
    pub flow_inspect_depth: usize,
    /// Signature page size for funding trace; a full page means "established"
    pub funding_signature_limit: usize,
    /// Wallets sharing a funder needed to flag a bundle
    pub bundle_min_size: usize,
    /// |flow %| beyond which pressure is "strong"
    pub strong_flow_percent: f64,
}

impl Default for WhaleConfig {
    fn default() -> Self {
        Self {
            sample_size: WHALE_SAMPLE_SIZE,
            flow_signature_limit: FLOW_SIGNATURE_LIMIT,
            flow_inspect_depth: FLOW_INSPECT_DEPTH,
            funding_signature_limit: FUNDING_SIGNATURE_LIMIT,
            bundle_min_size: BUNDLE_MIN_SIZE,
            strong_flow_percent: STRONG_FLOW_PERCENT,
        }
    }
}

/// Dominance store tunables
#[derive(Debug, Clone)]
pub struct DominanceConfig {
    /// Directory holding one history file per token
    pub store_dir: PathBuf,
    /// Samples kept per token
    pub history_limit: usize,
    /// Lock acquisition timeout (also the staleness horizon)
    pub lock_timeout: Duration,
    /// Lock polling interval
    pub lock_poll: Duration,
}

impl Default for DominanceConfig {
    fn default() -> Self {
        Self {
            store_dir: std::env::var("RUGSCOPE_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_DIR)),
            history_limit: DOMINANCE_HISTORY_LIMIT,
            lock_timeout: Duration::from_secs(DOMINANCE_LOCK_TIMEOUT_SECS),
            lock_poll: Duration::from_millis(DOMINANCE_LOCK_POLL_MS),
        }
    }
}

/// Configuration for the RugScope analysis pipeline
#[derive(Debug, Clone)]
pub struct ScopeConfig {
    /// Solana JSON-RPC endpoint
    pub rpc_url: String,
    /// Timeout for a single ledger call
    pub rpc_timeout: Duration,
    /// Maximum in-flight ledger calls
    pub concurrency_limit: usize,
    /// Ledger retry policy
    pub retry: RetryPolicy,
    /// DexScreener API base URL
    pub dexscreener_url: String,
    /// DexScreener request timeout
    pub price_timeout: Duration,
    /// Whale engine tunables
    pub whale: WhaleConfig,
    /// Dominance store tunables
    pub dominance: DominanceConfig,
}

impl ScopeConfig {
    /// Resolve the RPC endpoint from the environment
    ///
    /// Security: the Helius key is never logged.
    fn resolve_rpc_url() -> String {
        if let Ok(url) = std::env::var("SOLANA_RPC_URL") {
            if !url.is_empty() {
                info!("🔗 Using SOLANA_RPC_URL");
                return url;
            }
        }

        if let Ok(key) = std::env::var("HELIUS_API_KEY") {
            if !key.is_empty() && key != "YOUR_API_KEY" {
                info!("🔑 HELIUS_API_KEY configured (key hidden for security)");
                return build_helius_url(&key);
            }
        }

        info!("🌐 No RPC configured, falling back to public mainnet RPC");
        PUBLIC_SOLANA_RPC.to_string()
    }

    /// RPC URL with any API key masked (for logging)
    pub fn masked_rpc_url(&self) -> String {
        match self.rpc_url.split_once("api-key=") {
            Some((base, _)) => format!("{}api-key=***HIDDEN***", base),
            None => self.rpc_url.clone(),
        }
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            rpc_url: Self::resolve_rpc_url(),
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            concurrency_limit: RPC_CONCURRENCY_LIMIT,
            retry: RetryPolicy::default(),
            dexscreener_url: DEXSCREENER_API_BASE.to_string(),
            price_timeout: Duration::from_secs(DEXSCREENER_TIMEOUT_SECS),
            whale: WhaleConfig::default(),
            dominance: DominanceConfig::default(),
        }
    }
}
