//! RugScope API Server
//!
//! Usage:
//!   cargo run --bin rugscope_api
//!
//! Environment:
//!   PORT / RUGSCOPE_PORT - Server port (default: 8000)
//!   RUGSCOPE_HOST        - Server host (default: 0.0.0.0)
//!   SOLANA_RPC_URL       - Ledger endpoint (or HELIUS_API_KEY)
//!   RUGSCOPE_STORE_DIR   - Dominance history directory
//!   RUST_LOG             - Log filter (default: info)

use rugscope::api::{create_router, handlers::AppState};
use rugscope::utils::constants::{APP_NAME, APP_VERSION};
use rugscope::{ScopeConfig, TokenAnalyzer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = ScopeConfig::default();
    info!("🔗 RPC: {}", config.masked_rpc_url());
    info!("💾 Dominance store: {}", config.dominance.store_dir.display());

    let analyzer = Arc::new(TokenAnalyzer::from_config(&config)?);
    let state = Arc::new(AppState::new(analyzer.clone()));
    let app = create_router(state);

    // Hosting platforms set PORT; RUGSCOPE_PORT is for local runs
    let host = std::env::var("RUGSCOPE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("RUGSCOPE_PORT"))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("🚀 {} API v{} starting on http://{}", APP_NAME, APP_VERSION, addr);
    info!("Endpoints:");
    info!("  GET  /v1/analyze/:mint  - Full forensic report");
    info!("  GET  /v1/health         - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    let stats = analyzer.stats();
    info!("🛑 Shutdown complete");
    info!("   Total analyzed: {}", stats.total_analyzed);
    info!("   Total failed: {}", stats.total_failed);

    Ok(())
}
