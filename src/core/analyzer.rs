//! Token analyzer
//! Orchestrates the full forensic pipeline for one token:
//! price + mint account + supply + holders → concentration score →
//! whale engine ∥ dominance update → verdict.

use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::concentration::score_concentration;
use super::dominance::DominanceTracker;
use super::verdict::synthesize_verdict;
use super::whale::WhaleEngine;
use crate::models::config::ScopeConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{HolderAccount, ReportMeta, SecurityInfo, TokenIdentifier, TokenReport};
use crate::providers::dexscreener::{DexScreenerClient, PriceSource};
use crate::providers::rpc::LedgerGateway;
use crate::utils::constants::{round_to, DEFAULT_TOKEN_DECIMALS};

/// Holder accounts whose combined share is the "top 10"
const TOP_HOLDER_WINDOW: usize = 10;

/// Main analyzer struct
pub struct TokenAnalyzer {
    gateway: Arc<LedgerGateway>,
    prices: Arc<dyn PriceSource>,
    whales: WhaleEngine,
    dominance: Arc<DominanceTracker>,
    stats: AnalyzerStats,
}

/// Thread-safe statistics
#[derive(Default)]
struct AnalyzerStats {
    total_analyzed: AtomicU64,
    total_failed: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Point-in-time copy of the analyzer counters
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzerStatsSnapshot {
    pub total_analyzed: u64,
    pub total_failed: u64,
    pub avg_latency_ms: u64,
}

impl TokenAnalyzer {
    pub fn new(
        gateway: Arc<LedgerGateway>,
        prices: Arc<dyn PriceSource>,
        dominance: Arc<DominanceTracker>,
        config: &ScopeConfig,
    ) -> Self {
        Self {
            whales: WhaleEngine::new(gateway.clone(), config.whale.clone()),
            gateway,
            prices,
            dominance,
            stats: AnalyzerStats::default(),
        }
    }

    /// Production wiring: HTTP gateway, DexScreener, file-backed dominance store
    pub fn from_config(config: &ScopeConfig) -> AppResult<Self> {
        let gateway = Arc::new(LedgerGateway::from_config(config)?);
        let prices = Arc::new(DexScreenerClient::from_config(config));
        let dominance = Arc::new(DominanceTracker::from_config(&config.dominance));
        Ok(Self::new(gateway, prices, dominance, config))
    }

    /// Run the full pipeline for one token
    ///
    /// Fails only on an invalid identifier or when the ledger has no holder
    /// data; every other problem degrades to neutral values.
    pub async fn analyze(&self, mint: &str) -> AppResult<TokenReport> {
        let result = self.run(mint).await;
        match &result {
            Ok(report) => {
                self.stats.total_analyzed.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .total_latency_ms
                    .fetch_add((report.meta.execution_time_sec * 1000.0) as u64, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                warn!("❌ Analysis of {} failed: {}", mint, e);
            }
        }
        result
    }

    async fn run(&self, mint: &str) -> AppResult<TokenReport> {
        let start = Instant::now();
        let mint: TokenIdentifier = mint.parse()?;
        info!("🔍 Analyzing: {}", mint);

        let (price, mint_info, supply, accounts) = tokio::join!(
            self.prices.price_signal(mint.as_str()),
            self.gateway.get_account_info(mint.as_str()),
            self.gateway.get_token_supply(mint.as_str()),
            self.gateway.get_token_largest_accounts(mint.as_str()),
        );

        if accounts.is_empty() {
            return Err(AppError::token_not_found(format!("No holder data found for {}", mint)));
        }

        let decimals = mint_info.decimals.unwrap_or(DEFAULT_TOKEN_DECIMALS);
        let total_supply = supply
            .map(|s| s.to_ui(decimals))
            .filter(|s| *s != 0.0)
            .unwrap_or(1.0);

        let holders: Vec<HolderAccount> = accounts
            .iter()
            .map(|account| {
                let balance = account.amount.to_ui(decimals);
                HolderAccount {
                    address: account.address.clone(),
                    balance,
                    percent_of_supply: round_to(balance / total_supply * 100.0, 4),
                }
            })
            .collect();

        let top1_amount = holders[0].balance;
        let top10_amount: f64 = holders.iter().take(TOP_HOLDER_WINDOW).map(|h| h.balance).sum();
        let top1_percent = (top1_amount / total_supply * 100.0).min(100.0);
        let top10_percent = (top10_amount / total_supply * 100.0).min(100.0);

        // largest-accounts is capped at 20 entries, so it says nothing about
        // the real holder count
        let structural = score_concentration(top1_percent, top10_percent, 0);

        let (whale_metrics, dominance_metrics) = tokio::join!(
            self.whales.analyze(mint.as_str()),
            self.dominance.update(mint.as_str(), top1_percent),
        );

        let verdict = synthesize_verdict(structural.status, &whale_metrics, &dominance_metrics, &price);
        let elapsed = round_to(start.elapsed().as_secs_f64(), 2);

        info!(
            "✅ {} | risk: {} ({}) | {} | {}s",
            mint,
            verdict.risk_score,
            verdict.verdict_label,
            verdict.correlation_verdict.label(),
            elapsed
        );

        Ok(TokenReport {
            mint,
            timestamp: Utc::now().timestamp(),
            price_data: price,
            security: SecurityInfo {
                mint_authority: mint_info.mint_authority,
                freeze_authority: mint_info.freeze_authority,
            },
            holders,
            structural,
            whale_metrics,
            dominance_metrics,
            verdict,
            meta: ReportMeta {
                execution_time_sec: elapsed,
            },
        })
    }

    /// Get current statistics
    pub fn stats(&self) -> AnalyzerStatsSnapshot {
        let analyzed = self.stats.total_analyzed.load(Ordering::Relaxed);
        let latency = self.stats.total_latency_ms.load(Ordering::Relaxed);
        AnalyzerStatsSnapshot {
            total_analyzed: analyzed,
            total_failed: self.stats.total_failed.load(Ordering::Relaxed),
            avg_latency_ms: if analyzed > 0 { latency / analyzed } else { 0 },
        }
    }
}
