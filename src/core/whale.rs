//! Whale Flow & Funding-Trace Engine
//!
//! For the largest holders of a token:
//! 1. **Flow** - net token balance change across each wallet's most recent
//!    transactions, summed into a pressure reading (% of supply)
//! 2. **Funding trace** - who paid for the wallet's first transaction
//! 3. **Bundle detection** - several top wallets sharing one funder
//!
//! Every ledger call goes through the shared gateway limiter. A wallet whose
//! lookups fail contributes 0 flow and an `Unknown` trace; nothing aborts
//! the analysis.

use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::models::config::WhaleConfig;
use crate::models::types::{
    BundleVerdict, FlowSample, FundingTrace, WalletFunding, WhalePressure, WhalePressureResult,
};
use crate::providers::rpc::LedgerGateway;
use crate::providers::solana::{SolanaTokenBalance, SolanaTransaction};
use crate::utils::constants::{round_to, COMMITMENT_FINALIZED, DEFAULT_TOKEN_DECIMALS};

pub struct WhaleEngine {
    gateway: Arc<LedgerGateway>,
    config: WhaleConfig,
}

impl WhaleEngine {
    pub fn new(gateway: Arc<LedgerGateway>, config: WhaleConfig) -> Self {
        Self { gateway, config }
    }

    /// Analyze whale pressure and funding bundles for a token
    pub async fn analyze(&self, mint: &str) -> WhalePressureResult {
        let start = Instant::now();

        let (supply, holders) = tokio::join!(
            self.gateway.get_token_supply(mint),
            self.gateway.get_token_largest_accounts(mint),
        );

        let total_supply = supply
            .map(|s| s.to_ui(DEFAULT_TOKEN_DECIMALS))
            .filter(|s| *s != 0.0)
            .unwrap_or(1.0);

        if holders.is_empty() {
            debug!("🐋 No holder data for {}, whale pressure neutral", mint);
            return WhalePressureResult::neutral();
        }

        let wallets: Vec<String> = holders
            .into_iter()
            .take(self.config.sample_size)
            .map(|account| account.address)
            .collect();

        let flow_tasks = join_all(wallets.iter().map(|w| self.wallet_flow(w, mint)));
        let funding_tasks = join_all(wallets.iter().map(|w| self.funding_source(w)));
        let (flow_deltas, traces) = tokio::join!(flow_tasks, funding_tasks);

        let net_flow: f64 = flow_deltas.iter().sum();
        let flow_percent = round_to(net_flow / total_supply * 100.0, 4);
        let pressure = self.classify_pressure(flow_percent);
        let bundle = detect_bundle(&traces, self.config.bundle_min_size);

        let result = WhalePressureResult {
            pressure,
            net_flow_percent_supply: flow_percent,
            bundle,
            scanned_wallets: wallets.len(),
            execution_time_ms: start.elapsed().as_millis() as u64,
            flows: wallets
                .iter()
                .zip(flow_deltas)
                .map(|(wallet, net_delta)| FlowSample {
                    wallet: wallet.clone(),
                    net_delta,
                })
                .collect(),
            funding: wallets
                .iter()
                .zip(traces)
                .map(|(wallet, trace)| WalletFunding {
                    wallet: wallet.clone(),
                    trace,
                })
                .collect(),
        };

        info!(
            "🐋 {} | pressure: {} | flow: {}% | bundle: {} (size {}, funder {}) | {}ms",
            mint,
            result.pressure.label(),
            result.net_flow_percent_supply,
            result.bundle.detected,
            result.bundle.size,
            result.bundle.main_funder_label(),
            result.execution_time_ms
        );

        result
    }

    fn classify_pressure(&self, flow_percent: f64) -> WhalePressure {
        if flow_percent > self.config.strong_flow_percent {
            WhalePressure::StrongAccumulation
        } else if flow_percent < -self.config.strong_flow_percent {
            WhalePressure::StrongDistribution
        } else {
            WhalePressure::Neutral
        }
    }

    /// Net balance change of `wallet` in `mint` over its latest transactions
    pub async fn wallet_flow(&self, wallet: &str, mint: &str) -> f64 {
        let signatures = self
            .gateway
            .get_signatures_for_address(wallet, self.config.flow_signature_limit, Some(COMMITMENT_FINALIZED))
            .await;

        let mut net = 0.0;
        for info in signatures.iter().take(self.config.flow_inspect_depth) {
            match self.gateway.get_transaction(&info.signature).await {
                Some(tx) if tx.succeeded() => net += balance_delta(&tx, wallet, mint),
                _ => debug!("🐋 Skipping {} for {}", info.signature, wallet),
            }
        }
        net
    }

    /// Trace who funded `wallet`
    pub async fn funding_source(&self, wallet: &str) -> FundingTrace {
        let signatures = self
            .gateway
            .get_signatures_for_address(wallet, self.config.funding_signature_limit, None)
            .await;

        let Some(oldest) = signatures.last() else {
            return FundingTrace::Unknown;
        };
        if signatures.len() >= self.config.funding_signature_limit {
            return FundingTrace::EstablishedUser;
        }

        let Some(tx) = self.gateway.get_transaction(&oldest.signature).await else {
            return FundingTrace::Unknown;
        };

        match tx.fee_payer() {
            Some(signer) if signer == wallet => FundingTrace::SelfFunded,
            Some(signer) => FundingTrace::RealFunder(signer.to_string()),
            None => FundingTrace::Unknown,
        }
    }
}

/// post - pre balance of `wallet` in `mint` within one transaction
pub fn balance_delta(tx: &SolanaTransaction, wallet: &str, mint: &str) -> f64 {
    let Some(meta) = &tx.meta else {
        return 0.0;
    };

    let balance_of = |balances: &Option<Vec<SolanaTokenBalance>>| -> f64 {
        balances
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|b| b.mint == mint && owned_by(tx, b, wallet))
            .map(|b| b.ui_token_amount.to_ui(0))
            .unwrap_or(0.0)
    };

    balance_of(&meta.post_token_balances) - balance_of(&meta.pre_token_balances)
}

/// A token balance belongs to `wallet` if the wallet owns the token account or
/// is the account itself
fn owned_by(tx: &SolanaTransaction, balance: &SolanaTokenBalance, wallet: &str) -> bool {
    if balance.owner.as_deref() == Some(wallet) {
        return true;
    }
    tx.transaction
        .message
        .account_keys
        .get(balance.account_index)
        .is_some_and(|key| key.pubkey() == wallet)
}

/// Most frequent real funder among the traces; a bundle when it funded at
/// least `min_size` wallets. Ties go to the funder seen first.
pub fn detect_bundle(traces: &[FundingTrace], min_size: usize) -> BundleVerdict {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for funder in traces.iter().filter_map(FundingTrace::real_funder) {
        let count = counts.entry(funder).or_insert(0);
        if *count == 0 {
            order.push(funder);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for funder in order {
        let count = counts[funder];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((funder, count));
        }
    }

    match best {
        Some((funder, size)) => BundleVerdict {
            detected: size >= min_size.max(2),
            size,
            main_funder: Some(funder.to_string()),
        },
        None => BundleVerdict::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn real(addr: &str) -> FundingTrace {
        FundingTrace::RealFunder(addr.to_string())
    }

    #[test]
    fn test_bundle_detected() {
        let traces = vec![
            real("A"),
            real("A"),
            real("B"),
            FundingTrace::Unknown,
            FundingTrace::EstablishedUser,
            FundingTrace::SelfFunded,
            real("A"),
        ];
        let bundle = detect_bundle(&traces, 2);
        assert!(bundle.detected);
        assert_eq!(bundle.size, 3);
        assert_eq!(bundle.main_funder.as_deref(), Some("A"));
    }

    #[test]
    fn test_single_funders_are_not_a_bundle() {
        let bundle = detect_bundle(&[real("A"), real("B"), FundingTrace::Unknown], 2);
        assert!(!bundle.detected);
        assert_eq!(bundle.size, 1);
        assert_eq!(bundle.main_funder.as_deref(), Some("A"));
    }

    #[test]
    fn test_sentinels_only() {
        let bundle = detect_bundle(
            &[FundingTrace::EstablishedUser, FundingTrace::SelfFunded, FundingTrace::Unknown],
            2,
        );
        assert_eq!(bundle, BundleVerdict::none());
        assert_eq!(bundle.main_funder_label(), "None");
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let bundle = detect_bundle(&[real("B"), real("A"), real("A"), real("B")], 2);
        assert_eq!(bundle.main_funder.as_deref(), Some("B"));
        assert_eq!(bundle.size, 2);
    }

    #[test]
    fn test_configured_threshold() {
        let traces = [real("A"), real("A"), real("B")];
        assert!(!detect_bundle(&traces, 3).detected);
        assert!(detect_bundle(&traces, 2).detected);
    }

    fn parsed_tx(meta: serde_json::Value) -> SolanaTransaction {
        serde_json::from_value(json!({
            "transaction": {"message": {"accountKeys": [
                {"pubkey": "Payer", "signer": true},
                {"pubkey": "TokenAcct", "signer": false}
            ]}},
            "meta": meta
        }))
        .unwrap()
    }

    #[test]
    fn test_balance_delta_by_owner() {
        let tx = parsed_tx(json!({
            "err": null,
            "preTokenBalances": [
                {"accountIndex": 1, "mint": "Mint", "owner": "Whale", "uiTokenAmount": {"uiAmount": 100.0, "decimals": 6, "amount": "100000000"}},
                {"accountIndex": 1, "mint": "Other", "owner": "Whale", "uiTokenAmount": {"uiAmount": 5.0, "decimals": 6, "amount": "5000000"}}
            ],
            "postTokenBalances": [
                {"accountIndex": 1, "mint": "Mint", "owner": "Whale", "uiTokenAmount": {"uiAmount": 40.0, "decimals": 6, "amount": "40000000"}}
            ]
        }));
        assert_eq!(balance_delta(&tx, "Whale", "Mint"), -60.0);
        assert_eq!(balance_delta(&tx, "Someone", "Mint"), 0.0);
    }

    #[test]
    fn test_balance_delta_new_position_and_account_index() {
        // no pre balance: the whole post balance is inflow
        let tx = parsed_tx(json!({
            "err": null,
            "preTokenBalances": [],
            "postTokenBalances": [
                {"accountIndex": 1, "mint": "Mint", "uiTokenAmount": {"uiAmount": null, "decimals": 2, "amount": "1250"}}
            ]
        }));
        assert_eq!(balance_delta(&tx, "TokenAcct", "Mint"), 12.5);
    }
}
