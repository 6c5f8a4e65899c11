//! Type definitions for RugScope
//! All core data structures flowing between the gateway, the engines and the
//! verdict synthesizer.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::errors::AppError;
use crate::utils::constants::{BASE58_ALPHABET, MAX_ADDRESS_LEN, MIN_ADDRESS_LEN};

// ============================================
// TOKEN IDENTIFIER
// ============================================

/// Validated mint address (32-44 base58 characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TokenIdentifier(String);

impl TokenIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TokenIdentifier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() < MIN_ADDRESS_LEN || s.len() > MAX_ADDRESS_LEN {
            return Err(AppError::invalid_address(format!(
                "Invalid mint address length: {} (expected {}-{})",
                s.len(),
                MIN_ADDRESS_LEN,
                MAX_ADDRESS_LEN
            )));
        }
        if let Some(bad) = s.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
            return Err(AppError::invalid_address(format!(
                "Invalid base58 character '{}' in mint address",
                bad
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for TokenIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TokenIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Holder account with its share of supply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolderAccount {
    pub address: String,
    /// UI balance (decimals applied)
    pub balance: f64,
    pub percent_of_supply: f64,
}

// ============================================
// CONCENTRATION
// ============================================

/// Holder distribution status derived from the concentration score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConcentrationStatus {
    #[serde(rename = "Healthy Distribution")]
    Healthy,
    #[serde(rename = "Moderate Concentration")]
    Moderate,
    #[serde(rename = "High Concentration")]
    High,
    #[serde(rename = "Critical Centralization")]
    Critical,
}

impl ConcentrationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy Distribution",
            Self::Moderate => "Moderate Concentration",
            Self::High => "High Concentration",
            Self::Critical => "Critical Centralization",
        }
    }
}

/// Concentration metrics reported alongside the score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationMetrics {
    pub top1_percent: f64,
    pub top10_percent: f64,
    pub gini_proxy: f64,
    pub hhi_estimate: f64,
}

/// Concentration Scorer output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    /// Health score in [0, 100]
    pub score: f64,
    pub status: ConcentrationStatus,
    pub metrics: ConcentrationMetrics,
}

// ============================================
// WHALE FLOW & FUNDING
// ============================================

/// Net token balance change of one sampled wallet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSample {
    pub wallet: String,
    pub net_delta: f64,
}

/// Funding origin of a wallet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "address")]
pub enum FundingTrace {
    /// Fee payer of the wallet's first observed transaction
    RealFunder(String),
    /// Too much history to trace cheaply
    EstablishedUser,
    /// Wallet paid for its own creation
    SelfFunded,
    /// Lookup failed
    Unknown,
}

impl FundingTrace {
    /// Funder address, if this trace names a real one
    pub fn real_funder(&self) -> Option<&str> {
        match self {
            Self::RealFunder(address) => Some(address),
            _ => None,
        }
    }
}

/// Funding trace of one sampled wallet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletFunding {
    pub wallet: String,
    pub trace: FundingTrace,
}

/// Shared-funder ("bundle") detection result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleVerdict {
    #[serde(rename = "bundle_detected")]
    pub detected: bool,
    #[serde(rename = "bundle_size")]
    pub size: usize,
    #[serde(serialize_with = "funder_or_none")]
    pub main_funder: Option<String>,
}

impl BundleVerdict {
    pub fn none() -> Self {
        Self {
            detected: false,
            size: 0,
            main_funder: None,
        }
    }

    /// Main funder address, or "None"
    pub fn main_funder_label(&self) -> &str {
        self.main_funder.as_deref().unwrap_or("None")
    }
}

fn funder_or_none<S: Serializer>(funder: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(funder.as_deref().unwrap_or("None"))
}

/// Direction of whale balance flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WhalePressure {
    #[serde(rename = "Strong Accumulation")]
    StrongAccumulation,
    #[serde(rename = "Accumulation")]
    Accumulation,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Distribution")]
    Distribution,
    #[serde(rename = "Strong Distribution")]
    StrongDistribution,
}

impl WhalePressure {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongAccumulation => "Strong Accumulation",
            Self::Accumulation => "Accumulation",
            Self::Neutral => "Neutral",
            Self::Distribution => "Distribution",
            Self::StrongDistribution => "Strong Distribution",
        }
    }
}

/// Whale Flow & Funding-Trace Engine output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhalePressureResult {
    pub pressure: WhalePressure,
    /// Σ flows as % of total supply (4dp)
    pub net_flow_percent_supply: f64,
    #[serde(flatten)]
    pub bundle: BundleVerdict,
    pub scanned_wallets: usize,
    pub execution_time_ms: u64,
    pub flows: Vec<FlowSample>,
    pub funding: Vec<WalletFunding>,
}

impl WhalePressureResult {
    /// Result used when no holder data is available
    pub fn neutral() -> Self {
        Self {
            pressure: WhalePressure::Neutral,
            net_flow_percent_supply: 0.0,
            bundle: BundleVerdict::none(),
            scanned_wallets: 0,
            execution_time_ms: 0,
            flows: Vec::new(),
            funding: Vec::new(),
        }
    }
}

// ============================================
// DOMINANCE
// ============================================

/// One observation of the largest holder's share
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DominanceSample {
    /// Unix seconds
    pub ts: i64,
    /// Top-1 percent of supply
    pub val: f64,
}

/// Trend/volatility regime of dominance history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DominanceRegime {
    #[serde(rename = "Initial")]
    Initial,
    #[serde(rename = "Stable")]
    Stable,
    #[serde(rename = "Aggressive Consolidation")]
    AggressiveConsolidation,
    #[serde(rename = "Rapid Dilution")]
    RapidDilution,
    #[serde(rename = "Volatile Reallocation")]
    VolatileReallocation,
}

impl DominanceRegime {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Stable => "Stable",
            Self::AggressiveConsolidation => "Aggressive Consolidation",
            Self::RapidDilution => "Rapid Dilution",
            Self::VolatileReallocation => "Volatile Reallocation",
        }
    }
}

/// Single-step dominance movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DominanceStatus {
    #[serde(rename = "First Record")]
    FirstRecord,
    #[serde(rename = "Stable")]
    Stable,
    #[serde(rename = "Accumulation")]
    Accumulation,
    #[serde(rename = "Distribution")]
    Distribution,
}

/// Dominance Time-Series Store output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominanceShiftResult {
    pub previous_top1: f64,
    pub current_top1: f64,
    pub shift: f64,
    pub slope: f64,
    pub volatility: f64,
    pub regime: DominanceRegime,
    pub status: DominanceStatus,
}

impl DominanceShiftResult {
    /// First observation of a token
    pub fn first_record(current_top1: f64) -> Self {
        Self {
            previous_top1: 0.0,
            current_top1,
            shift: 0.0,
            slope: 0.0,
            volatility: 0.0,
            regime: DominanceRegime::Initial,
            status: DominanceStatus::FirstRecord,
        }
    }
}

// ============================================
// PRICE
// ============================================

/// Market data from the price collaborator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSignal {
    pub found: bool,
    pub price_usd: f64,
    pub price_change_1h: f64,
    pub volume_1h: f64,
    pub market_cap: f64,
    pub liquidity_usd: f64,
}

impl PriceSignal {
    /// Zeroed signal for a failed lookup
    pub fn not_found() -> Self {
        Self::default()
    }
}

// ============================================
// VERDICT
// ============================================

/// Risk intensity bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskIntensity {
    Low,
    Medium,
    High,
    Critical,
}

/// Who is moving the price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CorrelationVerdict {
    #[serde(rename = "Whale Driven Pump")]
    WhaleDrivenPump,
    #[serde(rename = "Divergence: Whales Selling into Pump")]
    WhalesSellingIntoPump,
    #[serde(rename = "Organic/Retail Rally")]
    OrganicRally,
    #[serde(rename = "Whale Driven Dump")]
    WhaleDrivenDump,
    #[serde(rename = "Whales Absorbing the Dip")]
    WhalesAbsorbingDip,
    #[serde(rename = "Retail Panic Sell")]
    RetailPanicSell,
    #[serde(rename = "Neutral/Low Volatility")]
    Neutral,
}

impl CorrelationVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            Self::WhaleDrivenPump => "Whale Driven Pump",
            Self::WhalesSellingIntoPump => "Divergence: Whales Selling into Pump",
            Self::OrganicRally => "Organic/Retail Rally",
            Self::WhaleDrivenDump => "Whale Driven Dump",
            Self::WhalesAbsorbingDip => "Whales Absorbing the Dip",
            Self::RetailPanicSell => "Retail Panic Sell",
            Self::Neutral => "Neutral/Low Volatility",
        }
    }
}

/// Verdict Synthesizer output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskVerdict {
    /// Risk score in [0, 100] (2dp)
    pub risk_score: f64,
    pub risk_intensity: RiskIntensity,
    pub verdict_label: String,
    pub verdict_description: String,
    pub correlation_verdict: CorrelationVerdict,
}

// ============================================
// FULL REPORT
// ============================================

/// Mint account authorities
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SecurityInfo {
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
}

/// Report metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMeta {
    pub execution_time_sec: f64,
}

/// Complete forensic report for one token
#[derive(Debug, Clone, Serialize)]
pub struct TokenReport {
    pub mint: TokenIdentifier,
    pub timestamp: i64,
    pub price_data: PriceSignal,
    pub security: SecurityInfo,
    pub holders: Vec<HolderAccount>,
    pub structural: ScoreResult,
    pub whale_metrics: WhalePressureResult,
    pub dominance_metrics: DominanceShiftResult,
    pub verdict: RiskVerdict,
    pub meta: ReportMeta,
}
