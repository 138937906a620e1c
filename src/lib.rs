//! Solana wallet PnL dashboard core.
//!
//! Combines three upstream data sources into a per-token cost-basis view:
//! - Solana JSON-RPC (SOL balance, token accounts across both token programs)
//! - DexScreener (pair prices, liquidity, market cap)
//! - Helius enhanced transactions (historical swaps and transfers)
//!
//! The cost-basis engine and PnL aggregation are pure, synchronous functions
//! over already-fetched data; all network access lives in the transport
//! adapters (`rpc`, `apis`) and degrades to empty results on failure.

pub mod apis;
pub mod costbasis;
pub mod dashboard;
pub mod errors;
pub mod global;
pub mod history;
pub mod holdings;
pub mod logger;
pub mod pnl;
pub mod price_feed;
pub mod rpc;
pub mod snapshot;
pub mod types;
