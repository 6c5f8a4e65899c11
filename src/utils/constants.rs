//! Constants Module - Single Source of Truth
//!
//! Every threshold, endpoint and limit used by the analysis pipeline lives here.
//! Other modules reference these names instead of repeating literals.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "RugScope";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for HTTP requests
pub const USER_AGENT: &str = "RugScope/0.1.0";

// ============================================
// LEDGER RPC CONSTANTS
// ============================================

/// Public Solana mainnet RPC (used when no dedicated endpoint is configured)
pub const PUBLIC_SOLANA_RPC: &str = "https://api.mainnet-beta.solana.com";

/// Helius mainnet RPC base; the API key is appended as a query parameter
pub const HELIUS_RPC_BASE: &str = "https://mainnet.helius-rpc.com/?api-key=";

/// Default timeout for a single ledger call (seconds)
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Maximum attempts per ledger call
pub const RPC_MAX_ATTEMPTS: u32 = 3;

/// Exponential backoff base: 0.5s × 2^attempt
pub const RPC_BASE_BACKOFF_MS: u64 = 500;

/// Linear rate-limit backoff step: (attempt + 1) × 1s
pub const RPC_RATE_LIMIT_STEP_MS: u64 = 1000;

/// In-flight ledger calls allowed at once
pub const RPC_CONCURRENCY_LIMIT: usize = 5;

/// JSON-RPC error code some providers use for throttling
pub const RPC_RATE_LIMIT_CODE: i64 = -32005;

/// Commitment used when sampling recent signatures
pub const COMMITMENT_FINALIZED: &str = "finalized";

/// Decimals assumed when the mint account cannot be read
pub const DEFAULT_TOKEN_DECIMALS: u32 = 9;

// ============================================
// TOKEN IDENTIFIER
// ============================================

/// Shortest valid base58 account address
pub const MIN_ADDRESS_LEN: usize = 32;

/// Longest valid base58 account address
pub const MAX_ADDRESS_LEN: usize = 44;

/// Base58 alphabet (no 0, O, I, l)
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

// ============================================
// WHALE FLOW & FUNDING TRACE
// ============================================

/// Top holders sampled per analysis
pub const WHALE_SAMPLE_SIZE: usize = 7;

/// Recent signatures fetched per wallet for flow analysis
pub const FLOW_SIGNATURE_LIMIT: usize = 15;

/// Transactions inspected per wallet for flow analysis
pub const FLOW_INSPECT_DEPTH: usize = 5;

/// Signatures fetched for funding trace; a full page marks an established wallet
pub const FUNDING_SIGNATURE_LIMIT: usize = 100;

/// Wallets sharing one funder needed to call it a bundle
pub const BUNDLE_MIN_SIZE: usize = 2;

/// Net flow (% of supply) above which pressure is accumulation
pub const STRONG_FLOW_PERCENT: f64 = 0.5;

// ============================================
// DOMINANCE TIME-SERIES
// ============================================

/// Samples kept per token
pub const DOMINANCE_HISTORY_LIMIT: usize = 10;

/// Cross-process lock acquisition timeout (seconds)
pub const DOMINANCE_LOCK_TIMEOUT_SECS: u64 = 5;

/// Lock polling interval (milliseconds)
pub const DOMINANCE_LOCK_POLL_MS: u64 = 100;

/// Default on-disk location of the dominance store
pub const DEFAULT_STORE_DIR: &str = "./dominance_store";

/// Regression slope (percent per hour) marking a directional regime
pub const SLOPE_REGIME_THRESHOLD: f64 = 0.5;

/// Population standard deviation marking a volatile regime
pub const VOLATILITY_REGIME_THRESHOLD: f64 = 2.0;

/// Single-step shift marking accumulation/distribution
pub const SHIFT_STATUS_THRESHOLD: f64 = 2.0;

// ============================================
// PRICE COLLABORATOR
// ============================================

/// DexScreener public API base
pub const DEXSCREENER_API_BASE: &str = "https://api.dexscreener.com/latest/dex";

/// DexScreener request timeout (seconds)
pub const DEXSCREENER_TIMEOUT_SECS: u64 = 10;

// ============================================
// VERDICT CAUSALITY LAYER
// ============================================

/// 1h price move (%) considered a pump/dump
pub const PRICE_MOVE_THRESHOLD: f64 = 2.0;

/// Whale net flow (% of supply) considered directional in the causality layer
pub const CAUSAL_FLOW_THRESHOLD: f64 = 0.1;

// ============================================
// HELPER FUNCTIONS
// ============================================

/// Build the Helius RPC URL for an API key
pub fn build_helius_url(api_key: &str) -> String {
    format!("{}{}", HELIUS_RPC_BASE, api_key)
}

/// Round to a fixed number of decimal places (reporting precision)
///
/// Rounds the exact binary value, ties to even, so `0.125` becomes `0.12`.
pub fn round_to(value: f64, places: i32) -> f64 {
    format!("{:.*}", places.max(0) as usize, value)
        .parse()
        .unwrap_or(value)
}
