//! RugScope Library
//!
//! On-chain forensic risk analysis for Solana tokens:
//! - Holder concentration scoring
//! - Whale flow pressure and insider "bundle" detection via funding traces
//! - Largest-holder dominance trend over successive analyses
//! - Verdict synthesis correlating whale flow with price action

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod store;
pub mod utils;

pub use crate::core::{
    detect_bundle, score_concentration, synthesize_verdict, AnalyzerStatsSnapshot, DominanceTracker,
    TokenAnalyzer, WhaleEngine,
};
pub use models::{AppError, AppResult, ErrorCode, ScopeConfig};
pub use providers::{DexScreenerClient, HttpTransport, LedgerGateway, LedgerTransport, PriceSource};
pub use store::{DominanceStore, FileStore, MemoryStore};
