//! RugScope - one-shot CLI
//!
//! Analyzes every mint given on the command line and prints one JSON report
//! per line to stdout. Logs go to stderr.
//!
//! Usage:
//!   rugscope <MINT> [MINT...]
//!
//! Environment:
//!   SOLANA_RPC_URL / HELIUS_API_KEY - ledger endpoint (default: public mainnet)
//!   RUGSCOPE_STORE_DIR              - dominance history directory
//!   RUST_LOG                        - log filter (default: info)

use eyre::{eyre, Result};
use rugscope::utils::constants::{APP_NAME, APP_VERSION};
use rugscope::{ScopeConfig, TokenAnalyzer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let mints: Vec<String> = std::env::args().skip(1).collect();
    if mints.is_empty() {
        eprintln!("Usage: rugscope <MINT> [MINT...]");
        return Err(eyre!("no mint address given"));
    }

    info!("🔍 {} v{}", APP_NAME, APP_VERSION);
    let config = ScopeConfig::default();
    info!("🔗 RPC: {}", config.masked_rpc_url());
    info!("💾 Dominance store: {}", config.dominance.store_dir.display());

    let analyzer = TokenAnalyzer::from_config(&config)?;

    let mut failed = 0;
    for mint in &mints {
        match analyzer.analyze(mint).await {
            Ok(report) => println!("{}", serde_json::to_string(&report)?),
            Err(e) => {
                error!("❌ {}: {}", mint, e);
                failed += 1;
            }
        }
    }

    let stats = analyzer.stats();
    info!(
        "📊 Analyzed: {} | Failed: {} | Avg latency: {}ms",
        stats.total_analyzed, stats.total_failed, stats.avg_latency_ms
    );

    if failed > 0 {
        return Err(eyre!("{} of {} analyses failed", failed, mints.len()));
    }
    Ok(())
}
