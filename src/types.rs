/// Core data model shared across the dashboard.
///
/// Everything here is an immutable, serializable record: transport adapters
/// produce them, the engines consume and derive from them. Market fields
/// default to zero rather than being absent so downstream arithmetic never
/// needs null checks beyond a single placeholder path.
use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

// ============================================================================
// HOLDINGS
// ============================================================================

/// Raw on-chain holding, rebuilt fresh on every balance refresh.
/// Zero-balance accounts are discarded at the RPC adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub mint: String,
    pub balance: f64,
    pub decimals: u8,
}

/// One DexScreener pair observation. Several pairs may reference the same
/// mint on either side of the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub base_mint: String,
    pub base_symbol: String,
    pub base_name: String,
    pub quote_mint: String,
    pub quote_symbol: String,
    pub quote_name: String,
    pub price_usd: f64,
    /// Price denominated in SOL (base side)
    pub price_native: f64,
    pub price_change_h24: f64,
    pub volume_h24: f64,
    pub liquidity_usd: f64,
    pub market_cap: f64,
    pub image_url: Option<String>,
    pub pair_address: Option<String>,
    pub pair_url: Option<String>,
}

/// TokenAccount enriched with its best market match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedToken {
    pub mint: String,
    pub balance: f64,
    pub decimals: u8,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub price_usd: f64,
    pub price_native: f64,
    pub price_change_h24: f64,
    pub volume_h24: f64,
    pub liquidity_usd: f64,
    pub market_cap: f64,
    pub image_url: Option<String>,
    pub pair_address: Option<String>,
    pub pair_url: Option<String>,
}

impl EnrichedToken {
    /// Placeholder for a holding with no market match; the holding itself
    /// is never dropped.
    pub fn placeholder(account: &TokenAccount) -> Self {
        Self {
            mint: account.mint.clone(),
            balance: account.balance,
            decimals: account.decimals,
            symbol: None,
            name: None,
            price_usd: 0.0,
            price_native: 0.0,
            price_change_h24: 0.0,
            volume_h24: 0.0,
            liquidity_usd: 0.0,
            market_cap: 0.0,
            image_url: None,
            pair_address: None,
            pair_url: None,
        }
    }

    pub fn usd_value(&self) -> f64 {
        self.balance * self.price_usd
    }
}

// ============================================================================
// TRANSACTIONS (validated at the indexer boundary)
// ============================================================================

/// Direct SOL balance movement inside a transaction, in lamports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeTransfer {
    pub from_user_account: String,
    pub to_user_account: String,
    pub amount: u64,
}

/// One leg: a directional transfer of a single token within a transaction.
/// Amounts are UI units (already decimal-adjusted by the indexer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub from_user_account: String,
    pub to_user_account: String,
    pub mint: String,
    pub token_amount: f64,
}

/// Enhanced swap transaction as resolved by the indexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapTransaction {
    pub signature: String,
    pub timestamp: i64,
    pub native_transfers: Vec<NativeTransfer>,
    pub token_transfers: Vec<TokenTransfer>,
}

/// Enhanced non-swap transfer transaction (airdrop, manual send/receive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferTransaction {
    pub signature: String,
    pub timestamp: i64,
    pub native_transfers: Vec<NativeTransfer>,
    pub token_transfers: Vec<TokenTransfer>,
}

// ============================================================================
// COST BASIS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeKind {
    Buy,
    Sell,
}

/// Atomic directional movement of a token against SOL, derived from a swap.
/// Created exclusively by the cost-basis engine; immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub kind: TradeKind,
    pub amount: f64,
    pub sol_amount: f64,
    pub timestamp: i64,
    pub signature: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferDirection {
    In,
    Out,
}

/// Non-swap token movement; recorded but carries no SOL cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub direction: TransferDirection,
    pub amount: f64,
    pub timestamp: i64,
    pub signature: String,
}

/// Per-mint accumulator built from a full re-scan of transaction history.
///
/// `trades` follows transaction processing order, not chronology; consumers
/// needing time order must sort explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBasisEntry {
    pub mint: String,
    pub bought: f64,
    pub sold: f64,
    pub sol_spent: f64,
    pub sol_received: f64,
    pub trades: Vec<Trade>,
    pub transfers: Vec<TransferRecord>,
}

impl CostBasisEntry {
    pub fn new(mint: &str) -> Self {
        Self {
            mint: mint.to_string(),
            bought: 0.0,
            sold: 0.0,
            sol_spent: 0.0,
            sol_received: 0.0,
            trades: Vec::new(),
            transfers: Vec::new(),
        }
    }

    /// Still-held portion of the position
    pub fn remaining(&self) -> f64 {
        self.bought - self.sold
    }

    pub fn buy_count(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.kind == TradeKind::Buy)
            .count()
    }

    pub fn sell_count(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.kind == TradeKind::Sell)
            .count()
    }
}

// ============================================================================
// DERIVED VIEWS
// ============================================================================

/// Portfolio-level summary, pure aggregation over enriched holdings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub total_value: f64,
    pub sol_balance: f64,
    pub token_count: usize,
    pub token_value: f64,
    pub top_holding_pct: f64,
    pub avg_token_value: f64,
}

/// Versioned price observation. Staleness is judged by the caller via
/// `as_of`; the value is never implicitly assumed fresh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price_usd: f64,
    pub as_of: DateTime<Utc>,
}

impl PriceQuote {
    pub fn empty() -> Self {
        Self {
            price_usd: 0.0,
            as_of: DateTime::<Utc>::MIN_UTC,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.price_usd <= 0.0
    }
}

/// One bucket boundary of the replayed portfolio history, SOL-denominated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub ts: i64,
    pub sol_balance: f64,
    pub token_value_sol: f64,
    pub total_sol: f64,
}
