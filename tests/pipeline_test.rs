//! End-to-end pipeline tests against an in-memory ledger

mod common;

use common::*;
use rugscope::models::config::WhaleConfig;
use rugscope::models::errors::ErrorCode;
use rugscope::models::types::{
    ConcentrationStatus, CorrelationVerdict, DominanceStatus, FundingTrace, RiskIntensity,
    WhalePressure,
};
use rugscope::store::{DominanceStore, FileStore};
use rugscope::{DominanceTracker, TokenAnalyzer, WhaleEngine};
use std::sync::Arc;
use std::time::Duration;

fn whale_engine(ledger: MockLedger) -> WhaleEngine {
    WhaleEngine::new(gateway(Arc::new(ledger)), WhaleConfig::default())
}

#[tokio::test]
async fn test_whale_engine_detects_bundle_and_dumping() {
    let result = whale_engine(insider_ledger()).analyze(MINT).await;

    assert_eq!(result.scanned_wallets, 3);
    assert_eq!(result.net_flow_percent_supply, -1.0);
    assert_eq!(result.pressure, WhalePressure::StrongDistribution);

    assert!(result.bundle.detected);
    assert_eq!(result.bundle.size, 2);
    assert_eq!(result.bundle.main_funder.as_deref(), Some("Funder"));

    let traces: Vec<_> = result.funding.iter().map(|f| f.trace.clone()).collect();
    assert_eq!(
        traces,
        vec![
            FundingTrace::RealFunder("Funder".to_string()),
            FundingTrace::RealFunder("Funder".to_string()),
            FundingTrace::EstablishedUser,
        ]
    );
    assert_eq!(result.flows[0].net_delta, -10.0);
    assert_eq!(result.flows[1].net_delta, 0.0);
}

#[tokio::test]
async fn test_whale_engine_samples_only_top_seven_holders() {
    let mut ledger = MockLedger::new().with_supply(10_000.0, 6);
    for i in 0..12 {
        ledger = ledger.with_holder(&format!("Holder{}", i), 1000.0 - i as f64 * 50.0);
    }
    let ledger = Arc::new(ledger);
    let engine = WhaleEngine::new(gateway(ledger.clone()), WhaleConfig::default());

    let result = engine.analyze(MINT).await;

    assert_eq!(result.scanned_wallets, 7);
    assert_eq!(result.flows.len(), 7);
    assert_eq!(result.funding.len(), 7);
    let wallets: Vec<&str> = result.funding.iter().map(|f| f.wallet.as_str()).collect();
    assert_eq!(wallets, (0..7).map(|i| format!("Holder{}", i)).collect::<Vec<_>>());

    let lookups = ledger.signature_lookups();
    // one flow lookup and one funding lookup per sampled wallet
    assert_eq!(lookups.len(), 14);
    assert!(lookups.iter().all(|w| w != "Holder7" && w != "Holder11"));
}

#[tokio::test]
async fn test_whale_flow_uses_raw_supply_without_ui_amount() {
    let ledger = MockLedger::new()
        .with_raw_supply(1_000_000_000, 6)
        .with_holder("Whale1", 500.0)
        .with_signatures("Whale1", 15, &["sell-1"])
        .with_transaction("sell-1", transfer_tx("Whale1", "Whale1", MINT, 510.0, 500.0));

    let result = whale_engine(ledger).analyze(MINT).await;

    // 10 tokens out of 1000, not out of a placeholder supply of 1
    assert_eq!(result.net_flow_percent_supply, -1.0);
    assert_eq!(result.pressure, WhalePressure::StrongDistribution);
}

#[tokio::test]
async fn test_whale_engine_without_holders_is_neutral() {
    let result = whale_engine(MockLedger::new().with_supply(1000.0, 6)).analyze(MINT).await;

    assert_eq!(result.pressure, WhalePressure::Neutral);
    assert_eq!(result.scanned_wallets, 0);
    assert!(!result.bundle.detected);
}

#[tokio::test]
async fn test_funding_source_variants() {
    let ledger = MockLedger::new()
        .with_signatures("SelfMade", 100, &["genesis"])
        .with_transaction("genesis", transfer_tx("SelfMade", "SelfMade", MINT, 0.0, 1.0))
        .with_signatures("Broken", 100, &["bad"])
        .with_broken_transaction("bad");
    let engine = whale_engine(ledger);

    assert_eq!(engine.funding_source("SelfMade").await, FundingTrace::SelfFunded);
    assert_eq!(engine.funding_source("Broken").await, FundingTrace::Unknown);
    assert_eq!(engine.funding_source("NoHistory").await, FundingTrace::Unknown);
}

#[tokio::test]
async fn test_wallet_flow_skips_failed_transactions() {
    let mut failed = transfer_tx("W", "W", MINT, 0.0, 1000.0);
    failed["meta"]["err"] = serde_json::json!({"InstructionError": [0, "Custom"]});

    let ledger = MockLedger::new()
        .with_signatures("W", 15, &["buy", "failed", "missing", "sell"])
        .with_transaction("buy", transfer_tx("W", "W", MINT, 10.0, 35.0))
        .with_transaction("failed", failed)
        .with_transaction("sell", transfer_tx("W", "W", MINT, 35.0, 30.0));

    assert_eq!(whale_engine(ledger).wallet_flow("W", MINT).await, 20.0);
}

#[tokio::test]
async fn test_wallet_flow_inspects_only_recent_transactions() {
    let signatures: Vec<String> = (0..15).map(|i| format!("buy-{}", i)).collect();
    let refs: Vec<&str> = signatures.iter().map(String::as_str).collect();
    let mut ledger = MockLedger::new().with_signatures("W", 15, &refs);
    for sig in &signatures {
        ledger = ledger.with_transaction(sig, transfer_tx("W", "W", MINT, 0.0, 1.0));
    }

    assert_eq!(whale_engine(ledger).wallet_flow("W", MINT).await, 5.0);
}

#[tokio::test]
async fn test_full_report_for_insider_token() {
    let analyzer = analyzer(Arc::new(insider_ledger()), price_moving(5.0));
    let report = analyzer.analyze(MINT).await.unwrap();

    assert_eq!(report.mint.as_str(), MINT);
    assert_eq!(report.security.mint_authority.as_deref(), Some("MintAuth111"));
    assert_eq!(report.holders.len(), 3);
    assert_eq!(report.holders[0].percent_of_supply, 50.0);

    assert_eq!(report.structural.metrics.top1_percent, 50.0);
    assert_eq!(report.structural.metrics.top10_percent, 80.0);
    assert_eq!(report.structural.score, 0.0);
    assert_eq!(report.structural.status, ConcentrationStatus::Critical);

    assert_eq!(report.dominance_metrics.status, DominanceStatus::FirstRecord);

    let verdict = &report.verdict;
    assert_eq!(verdict.risk_score, 100.0);
    assert_eq!(verdict.risk_intensity, RiskIntensity::Critical);
    assert_eq!(verdict.verdict_label, "HIGH RUG RISK");
    assert_eq!(verdict.correlation_verdict, CorrelationVerdict::WhalesSellingIntoPump);
    assert_eq!(
        verdict.verdict_description,
        "Extreme centralization. INSIDER BUNDLE DETECTED. Whales dumping. Exit liquidity trap detected."
    );
}

#[tokio::test]
async fn test_report_serializes_flat_bundle_fields() {
    let analyzer = analyzer(Arc::new(insider_ledger()), price_moving(0.0));
    let report = analyzer.analyze(MINT).await.unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["whale_metrics"]["bundle_detected"], true);
    assert_eq!(json["whale_metrics"]["bundle_size"], 2);
    assert_eq!(json["whale_metrics"]["main_funder"], "Funder");
    assert_eq!(json["dominance_metrics"]["status"], "First Record");
    assert_eq!(json["verdict"]["correlation_verdict"], "Neutral/Low Volatility");
}

#[tokio::test]
async fn test_repeat_analysis_extends_dominance_history() {
    let analyzer = analyzer(Arc::new(insider_ledger()), price_moving(0.0));

    analyzer.analyze(MINT).await.unwrap();
    let second = analyzer.analyze(MINT).await.unwrap();

    assert_eq!(second.dominance_metrics.previous_top1, 50.0);
    assert_eq!(second.dominance_metrics.shift, 0.0);
    assert_eq!(second.dominance_metrics.status, DominanceStatus::Stable);

    let stats = analyzer.stats();
    assert_eq!(stats.total_analyzed, 2);
    assert_eq!(stats.total_failed, 0);
}

#[tokio::test]
async fn test_token_without_holders_is_not_found() {
    let ledger = Arc::new(MockLedger::new().with_supply(1000.0, 6));
    let analyzer = analyzer(ledger, price_moving(0.0));

    let err = analyzer.analyze(MINT).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::TokenNotFound);
    assert_eq!(analyzer.stats().total_failed, 1);
}

#[tokio::test]
async fn test_invalid_mint_is_rejected_before_any_ledger_call() {
    let ledger = Arc::new(insider_ledger());
    let analyzer = analyzer(ledger.clone(), price_moving(0.0));

    let err = analyzer.analyze("0OIl-not-base58").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::TokenInvalidAddress);
    assert_eq!(ledger.calls(), 0);
}

#[tokio::test]
async fn test_dominance_persists_to_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path(), Duration::from_secs(2), Duration::from_millis(10)));
    let dominance = Arc::new(DominanceTracker::new(store.clone(), 10));

    let config = rugscope::ScopeConfig::default();
    let analyzer = TokenAnalyzer::new(
        gateway(Arc::new(insider_ledger())),
        Arc::new(StaticPrice(price_moving(0.0))),
        dominance,
        &config,
    );
    analyzer.analyze(MINT).await.unwrap();

    assert!(store.path_for(MINT).exists());
    let history = store.get(MINT).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].val, 50.0);
}
