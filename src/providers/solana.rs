//! Solana RPC wire types
//!
//! Response shapes for the handful of JSON-RPC methods the pipeline consumes:
//! - getTokenSupply / getTokenLargestAccounts
//! - getSignaturesForAddress
//! - getTransaction (jsonParsed)
//! - getAccountInfo (jsonParsed mint account)
//!
//! Fields are defaulted generously: a response missing a field decodes to a
//! neutral value instead of failing the whole payload.

use serde::Deserialize;

/// `{ "context": ..., "value": T }` wrapper used by most account methods
#[derive(Debug, Clone, Deserialize)]
pub struct RpcValue<T> {
    pub value: T,
}

/// Token amount as returned by the token RPC methods
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenAmount {
    pub amount: Option<String>,
    pub decimals: Option<u32>,
    pub ui_amount: Option<f64>,
    pub ui_amount_string: Option<String>,
}

impl TokenAmount {
    /// UI amount, falling back to raw amount / 10^decimals
    pub fn to_ui(&self, decimals: u32) -> f64 {
        if let Some(ui) = self.ui_amount {
            return ui;
        }
        self.amount
            .as_deref()
            .and_then(|raw| raw.parse::<f64>().ok())
            .map(|raw| raw / 10f64.powi(self.decimals.unwrap_or(decimals) as i32))
            .unwrap_or(0.0)
    }
}

/// Entry of getTokenLargestAccounts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LargestAccount {
    pub address: String,
    #[serde(flatten)]
    pub amount: TokenAmount,
}

/// Entry of getSignaturesForAddress (newest first)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    #[serde(default)]
    pub slot: u64,
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

/// Parsed transaction
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaTransaction {
    #[serde(default)]
    pub slot: u64,
    pub transaction: TransactionData,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    #[serde(default)]
    pub block_time: Option<i64>,
}

impl SolanaTransaction {
    /// True when the transaction executed without error
    pub fn succeeded(&self) -> bool {
        matches!(&self.meta, Some(meta) if meta.err.is_none())
    }

    /// Fee payer: first signer in the account list
    pub fn fee_payer(&self) -> Option<&str> {
        let keys = &self.transaction.message.account_keys;
        keys.iter()
            .find(|key| key.is_signer())
            .or_else(|| keys.iter().find(|key| matches!(key, AccountKey::Plain(_))))
            .map(AccountKey::pubkey)
    }
}

/// Transaction data
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionData {
    #[serde(default)]
    pub signatures: Vec<String>,
    pub message: TransactionMessage,
}

/// Transaction message
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMessage {
    #[serde(default)]
    pub account_keys: Vec<AccountKey>,
}

/// Account key: parsed object (jsonParsed) or bare string (json)
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AccountKey {
    Parsed {
        pubkey: String,
        #[serde(default)]
        signer: bool,
        #[serde(default)]
        writable: bool,
    },
    Plain(String),
}

impl AccountKey {
    pub fn pubkey(&self) -> &str {
        match self {
            Self::Parsed { pubkey, .. } => pubkey,
            Self::Plain(pubkey) => pubkey,
        }
    }

    pub fn is_signer(&self) -> bool {
        matches!(self, Self::Parsed { signer: true, .. })
    }
}

/// Transaction metadata
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionMeta {
    pub err: Option<serde_json::Value>,
    pub fee: u64,
    pub pre_token_balances: Option<Vec<SolanaTokenBalance>>,
    pub post_token_balances: Option<Vec<SolanaTokenBalance>>,
}

/// Token balance in transaction
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolanaTokenBalance {
    pub account_index: usize,
    pub mint: String,
    pub owner: Option<String>,
    pub ui_token_amount: TokenAmount,
}

/// Parsed SPL mint account (getAccountInfo, jsonParsed)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MintInfo {
    pub decimals: Option<u32>,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub supply: Option<String>,
}

impl MintInfo {
    /// Extract `value.data.parsed.info` from a getAccountInfo result
    pub fn from_account_result(result: &serde_json::Value) -> Self {
        result
            .get("value")
            .and_then(|v| v.get("data"))
            .and_then(|d| d.get("parsed"))
            .and_then(|p| p.get("info"))
            .and_then(|info| serde_json::from_value(info.clone()).ok())
            .unwrap_or_default()
    }
}
