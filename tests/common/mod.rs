//! Shared fixtures: an in-memory ledger and a fixed price source

#![allow(dead_code)]

use async_trait::async_trait;
use rugscope::models::config::{RetryPolicy, ScopeConfig};
use rugscope::models::types::PriceSignal;
use rugscope::providers::rpc::{CallFailure, LedgerGateway, LedgerTransport};
use rugscope::providers::PriceSource;
use rugscope::store::MemoryStore;
use rugscope::{DominanceTracker, TokenAnalyzer};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

/// Ledger that answers from fixed tables, dispatching on the JSON-RPC method
#[derive(Default)]
pub struct MockLedger {
    supply: Option<Value>,
    accounts: Vec<Value>,
    mint_account: Option<Value>,
    /// (address, limit) -> signatures, newest first
    signatures: HashMap<(String, u64), Vec<String>>,
    transactions: HashMap<String, Value>,
    /// Signatures whose getTransaction returns a JSON-RPC error
    broken: HashSet<String>,
    calls: AtomicUsize,
    signature_lookups: Mutex<Vec<String>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_supply(mut self, ui_amount: f64, decimals: u32) -> Self {
        self.supply = Some(json!({
            "amount": format!("{}", (ui_amount * 10f64.powi(decimals as i32)) as u128),
            "decimals": decimals,
            "uiAmount": ui_amount,
        }));
        self
    }

    /// Supply reported without `uiAmount`, as some RPC providers do
    pub fn with_raw_supply(mut self, amount: u64, decimals: u32) -> Self {
        self.supply = Some(json!({
            "amount": amount.to_string(),
            "decimals": decimals,
            "uiAmount": null,
        }));
        self
    }

    pub fn with_holder(mut self, address: &str, ui_amount: f64) -> Self {
        self.accounts.push(json!({
            "address": address,
            "amount": "0",
            "decimals": 6,
            "uiAmount": ui_amount,
        }));
        self
    }

    pub fn with_mint_account(mut self, decimals: u32, mint_authority: Option<&str>) -> Self {
        self.mint_account = Some(json!({
            "value": {"data": {"parsed": {"info": {
                "decimals": decimals,
                "mintAuthority": mint_authority,
                "freezeAuthority": null,
                "supply": "0",
            }}}}
        }));
        self
    }

    pub fn with_signatures(mut self, address: &str, limit: u64, signatures: &[&str]) -> Self {
        self.signatures.insert(
            (address.to_string(), limit),
            signatures.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_transaction(mut self, signature: &str, tx: Value) -> Self {
        self.transactions.insert(signature.to_string(), tx);
        self
    }

    pub fn with_broken_transaction(mut self, signature: &str) -> Self {
        self.broken.insert(signature.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Addresses passed to getSignaturesForAddress, in call order
    pub fn signature_lookups(&self) -> Vec<String> {
        self.signature_lookups.lock().unwrap().clone()
    }

    fn result_for(&self, method: &str, params: &Value) -> Result<Value, Value> {
        let first = params[0].as_str().unwrap_or_default();
        let result = match method {
            "getTokenSupply" => match &self.supply {
                Some(supply) => json!({"context": {"slot": 1}, "value": supply}),
                None => Value::Null,
            },
            "getTokenLargestAccounts" => json!({"context": {"slot": 1}, "value": self.accounts}),
            "getAccountInfo" => self.mint_account.clone().unwrap_or(json!({"value": null})),
            "getSignaturesForAddress" => {
                self.signature_lookups.lock().unwrap().push(first.to_string());
                let limit = params[1]["limit"].as_u64().unwrap_or_default();
                let signatures = self
                    .signatures
                    .get(&(first.to_string(), limit))
                    .cloned()
                    .unwrap_or_default();
                Value::Array(
                    signatures
                        .into_iter()
                        .map(|s| json!({"signature": s, "slot": 1, "err": null, "blockTime": null}))
                        .collect(),
                )
            }
            "getTransaction" => {
                if self.broken.contains(first) {
                    return Err(json!({"code": -32602, "message": "Invalid params"}));
                }
                self.transactions.get(first).cloned().unwrap_or(Value::Null)
            }
            _ => return Err(json!({"code": -32601, "message": "Method not found"})),
        };
        Ok(result)
    }
}

#[async_trait]
impl LedgerTransport for MockLedger {
    async fn send(&self, payload: Value) -> Result<Value, CallFailure> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let method = payload["method"].as_str().unwrap_or_default();
        Ok(match self.result_for(method, &payload["params"]) {
            Ok(result) => json!({"jsonrpc": "2.0", "id": payload["id"], "result": result}),
            Err(error) => json!({"jsonrpc": "2.0", "id": payload["id"], "error": error}),
        })
    }
}

/// Parsed transaction paid for by `payer` that moves `owner`'s balance of
/// `mint` from `pre` to `post`
pub fn transfer_tx(payer: &str, owner: &str, mint: &str, pre: f64, post: f64) -> Value {
    let balance = |amount: f64| {
        json!([{
            "accountIndex": 1,
            "mint": mint,
            "owner": owner,
            "uiTokenAmount": {"uiAmount": amount, "decimals": 6, "amount": format!("{}", (amount * 1e6) as u64)},
        }])
    };
    json!({
        "slot": 1,
        "blockTime": 1_700_000_000,
        "transaction": {
            "signatures": ["sig"],
            "message": {"accountKeys": [
                {"pubkey": payer, "signer": true, "writable": true},
                {"pubkey": "TokenAccount1111", "signer": false, "writable": true}
            ]}
        },
        "meta": {
            "err": null,
            "fee": 5000,
            "preTokenBalances": balance(pre),
            "postTokenBalances": balance(post),
        }
    })
}

/// Price source returning the same signal for every mint
pub struct StaticPrice(pub PriceSignal);

#[async_trait]
impl PriceSource for StaticPrice {
    async fn price_signal(&self, _mint: &str) -> PriceSignal {
        self.0.clone()
    }
}

pub fn price_moving(change_1h: f64) -> PriceSignal {
    PriceSignal {
        found: true,
        price_usd: 0.00002,
        price_change_1h: change_1h,
        volume_1h: 10_000.0,
        market_cap: 1_000_000.0,
        liquidity_usd: 50_000.0,
    }
}

pub fn gateway(ledger: Arc<MockLedger>) -> Arc<LedgerGateway> {
    Arc::new(LedgerGateway::new(ledger, 5, RetryPolicy::immediate(3)))
}

pub fn analyzer(ledger: Arc<MockLedger>, price: PriceSignal) -> TokenAnalyzer {
    let config = ScopeConfig::default();
    let dominance = Arc::new(DominanceTracker::new(Arc::new(MemoryStore::new()), 10));
    TokenAnalyzer::new(gateway(ledger), Arc::new(StaticPrice(price)), dominance, &config)
}

/// The insider scenario: three holders, the two largest funded by the same
/// wallet, the largest selling 1% of supply
pub fn insider_ledger() -> MockLedger {
    MockLedger::new()
        .with_supply(1000.0, 6)
        .with_mint_account(6, Some("MintAuth111"))
        .with_holder("Whale1", 500.0)
        .with_holder("Whale2", 200.0)
        .with_holder("Whale3", 100.0)
        .with_signatures("Whale1", 15, &["sell-1"])
        .with_transaction("sell-1", transfer_tx("Whale1", "Whale1", MINT, 510.0, 500.0))
        .with_signatures("Whale1", 100, &["newer-1", "first-1"])
        .with_transaction("first-1", transfer_tx("Funder", "Whale1", MINT, 0.0, 510.0))
        .with_signatures("Whale2", 100, &["first-2"])
        .with_transaction("first-2", transfer_tx("Funder", "Whale2", MINT, 0.0, 200.0))
        .with_signatures("Whale3", 100, &vec!["old"; 100])
}
