//! DexScreener API Client - price collaborator
//!
//! Supplies the 1h price move, volume, market cap and liquidity the verdict's
//! causality layer needs. The first pair DexScreener returns is its most liquid
//! one and is used as-is.
//!
//! API: https://api.dexscreener.com/latest/dex/tokens/{tokenAddress}
//! Free, no API key required

use async_trait::async_trait;
use eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::config::ScopeConfig;
use crate::models::types::PriceSignal;
use crate::utils::constants::{DEXSCREENER_API_BASE, DEXSCREENER_TIMEOUT_SECS, USER_AGENT as USER_AGENT_CONST};

/// DexScreener API response
#[derive(Debug, Deserialize)]
pub struct DexScreenerResponse {
    #[serde(default)]
    pub pairs: Option<Vec<DexPair>>,
}

/// A trading pair from DexScreener
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DexPair {
    pub chain_id: String,
    pub dex_id: String,
    pub pair_address: String,
    /// Price in USD (DexScreener sends it as a string)
    pub price_usd: Option<String>,
    pub price_change: Option<DexWindow>,
    pub volume: Option<DexWindow>,
    pub liquidity: Option<DexLiquidity>,
    pub fdv: Option<f64>,
}

/// Per-window figures (`m5`, `h1`, `h6`, `h24`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DexWindow {
    pub h1: Option<f64>,
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DexLiquidity {
    pub usd: Option<f64>,
}

impl DexPair {
    /// Project the pair onto the fields the verdict consumes
    pub fn to_price_signal(&self) -> PriceSignal {
        PriceSignal {
            found: true,
            price_usd: self
                .price_usd
                .as_deref()
                .and_then(|p| p.parse::<f64>().ok())
                .unwrap_or(0.0),
            price_change_1h: self.price_change.as_ref().and_then(|w| w.h1).unwrap_or(0.0),
            volume_1h: self.volume.as_ref().and_then(|w| w.h1).unwrap_or(0.0),
            market_cap: self.fdv.unwrap_or(0.0),
            liquidity_usd: self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0),
        }
    }
}

/// DexScreener API client
pub struct DexScreenerClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for DexScreenerClient {
    fn default() -> Self {
        Self::new(DEXSCREENER_API_BASE, Duration::from_secs(DEXSCREENER_TIMEOUT_SECS))
    }
}

impl DexScreenerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .gzip(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &ScopeConfig) -> Self {
        Self::new(config.dexscreener_url.clone(), config.price_timeout)
    }

    /// Fetch all pairs for a token address, in DexScreener's order
    pub async fn get_token_pairs(&self, token_address: &str) -> Result<Vec<DexPair>> {
        let url = format!("{}/tokens/{}", self.base_url, token_address);
        debug!("🔍 DexScreener: Fetching pairs for {}", token_address);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| eyre!("DexScreener request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(eyre!("DexScreener API error: {}", response.status()));
        }

        let data: DexScreenerResponse = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse DexScreener response: {}", e))?;

        Ok(data.pairs.unwrap_or_default())
    }

    /// Price signal for a token; `found: false` with zeroed fields on any failure
    pub async fn fetch_price_signal(&self, token_address: &str) -> PriceSignal {
        match self.get_token_pairs(token_address).await {
            Ok(pairs) => signal_from_pairs(&pairs),
            Err(e) => {
                warn!("⚠️ DexScreener error for {}: {}", token_address, e);
                PriceSignal::not_found()
            }
        }
    }
}

/// Source of market data for the verdict's causality layer
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Never fails: lookups that go wrong yield `PriceSignal::not_found()`
    async fn price_signal(&self, mint: &str) -> PriceSignal;
}

#[async_trait]
impl PriceSource for DexScreenerClient {
    async fn price_signal(&self, mint: &str) -> PriceSignal {
        self.fetch_price_signal(mint).await
    }
}

/// First (most liquid) pair's signal, or not-found when there are no pairs
pub fn signal_from_pairs(pairs: &[DexPair]) -> PriceSignal {
    pairs
        .first()
        .map(DexPair::to_price_signal)
        .unwrap_or_else(PriceSignal::not_found)
}
