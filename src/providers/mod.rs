//! Providers Module - External Data Sources
//!
//! Ledger gateway (Solana JSON-RPC), its wire types, and DexScreener prices.

pub mod dexscreener;
pub mod rpc;
pub mod solana;

pub use dexscreener::*;
pub use rpc::*;
pub use solana::*;
