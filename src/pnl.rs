/// PnL aggregation over cost-basis ledgers.
///
/// Realized PnL is always computable from the ledger alone; unrealized PnL
/// marks the still-held portion at the current price and silently collapses
/// toward realized-only when no usable price exists. The two portfolio
/// aggregates are deliberately distinct: `portfolio_realized_pnl` sums the
/// closed flows only, `portfolio_total_pnl` adds open positions at current
/// prices.
use crate::types::{ CostBasisEntry, EnrichedToken, TradeKind };
use serde::Serialize;
use std::collections::HashMap;

/// Ledger-form realized PnL: SOL recovered minus SOL spent, the whole
/// position's flow. Always computable, independent of current price. This
/// is the form portfolio aggregates sum.
pub fn realized_pnl(entry: &CostBasisEntry) -> f64 {
    entry.sol_received - entry.sol_spent
}

/// Total PnL for a token.
///
/// With the position fully exited, or with no usable SOL-denominated
/// price, this is exactly the ledger realized PnL. For an open position
/// the cost of the remaining units must not be double-counted: realized
/// covers only the sold portion at average cost, and unrealized marks the
/// remainder against that same average cost.
pub fn token_total_pnl(entry: &CostBasisEntry, current: Option<&EnrichedToken>) -> f64 {
    let remaining = entry.remaining();

    let price_native = current.map(|t| t.price_native).unwrap_or(0.0);
    if remaining <= 0.0 || price_native <= 0.0 {
        return realized_pnl(entry);
    }

    let avg_cost = if entry.bought > 0.0 { entry.sol_spent / entry.bought } else { 0.0 };
    let realized_closed = entry.sol_received - entry.sold * avg_cost;
    let unrealized = remaining * price_native - remaining * avg_cost;
    realized_closed + unrealized
}

/// Sum of realized PnL across all ledgers; open positions excluded
pub fn portfolio_realized_pnl(cost_basis: &HashMap<String, CostBasisEntry>) -> f64 {
    cost_basis.values().map(realized_pnl).sum()
}

/// Sum of total PnL (realized + unrealized at current prices) across all
/// ledgers
pub fn portfolio_total_pnl(
    cost_basis: &HashMap<String, CostBasisEntry>,
    tokens: &[EnrichedToken]
) -> f64 {
    cost_basis
        .values()
        .map(|entry| token_total_pnl(entry, find_token(tokens, &entry.mint)))
        .sum()
}

fn find_token<'a>(tokens: &'a [EnrichedToken], mint: &str) -> Option<&'a EnrichedToken> {
    tokens.iter().find(|t| t.mint == mint)
}

/// The single best trade: highest-proceeds SELL across all ledgers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestTrade {
    pub mint: String,
    pub symbol: Option<String>,
    pub sol: f64,
    pub signature: Option<String>,
}

/// Find the SELL trade with the highest SOL proceeds. When no sells exist,
/// fall back to the token with the highest total PnL, which covers an
/// entirely-unrealized but profitable position.
pub fn best_trade(
    cost_basis: &HashMap<String, CostBasisEntry>,
    tokens: &[EnrichedToken]
) -> Option<BestTrade> {
    let mut best: Option<BestTrade> = None;

    for entry in cost_basis.values() {
        let symbol = find_token(tokens, &entry.mint).and_then(|t| t.symbol.clone());
        for trade in &entry.trades {
            if trade.kind == TradeKind::Sell && trade.sol_amount > 0.0 {
                if best.as_ref().map_or(true, |b| trade.sol_amount > b.sol) {
                    best = Some(BestTrade {
                        mint: entry.mint.clone(),
                        symbol: symbol.clone(),
                        sol: trade.sol_amount,
                        signature: Some(trade.signature.clone()),
                    });
                }
            }
        }
    }

    if best.is_none() {
        for entry in cost_basis.values() {
            let token = find_token(tokens, &entry.mint);
            let pnl = token_total_pnl(entry, token);
            if best.as_ref().map_or(true, |b| pnl > b.sol) {
                best = Some(BestTrade {
                    mint: entry.mint.clone(),
                    symbol: token.and_then(|t| t.symbol.clone()),
                    sol: pnl,
                    signature: None,
                });
            }
        }
    }

    best
}

/// Portfolio-level PnL rollup for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlSummary {
    pub net_realized_sol: f64,
    pub total_spent_sol: f64,
    pub total_received_sol: f64,
    pub total_trades: usize,
    pub tokens_traded: usize,
    pub winning_tokens: usize,
    pub win_rate_pct: f64,
    pub best_trade: Option<BestTrade>,
}

/// Aggregate the full cost-basis map into one summary.
///
/// A token counts as winning when its total PnL (including unrealized) is
/// positive. With no ledgers at all the win rate is 0, not NaN.
pub fn summarize(
    cost_basis: &HashMap<String, CostBasisEntry>,
    tokens: &[EnrichedToken]
) -> PnlSummary {
    let tokens_traded = cost_basis.len();
    let winning_tokens = cost_basis
        .values()
        .filter(|entry| token_total_pnl(entry, find_token(tokens, &entry.mint)) > 0.0)
        .count();
    let win_rate_pct = if tokens_traded > 0 {
        ((winning_tokens as f64) / (tokens_traded as f64)) * 100.0
    } else {
        0.0
    };

    PnlSummary {
        net_realized_sol: portfolio_realized_pnl(cost_basis),
        total_spent_sol: cost_basis
            .values()
            .map(|e| e.sol_spent)
            .sum(),
        total_received_sol: cost_basis
            .values()
            .map(|e| e.sol_received)
            .sum(),
        total_trades: cost_basis
            .values()
            .map(|e| e.trades.len())
            .sum(),
        tokens_traded,
        winning_tokens,
        win_rate_pct,
        best_trade: best_trade(cost_basis, tokens),
    }
}

/// Per-token PnL listing, sorted by realized PnL descending
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenPnlRow {
    pub mint: String,
    pub symbol: Option<String>,
    pub realized_sol: f64,
    pub total_sol: f64,
    pub buys: usize,
    pub sells: usize,
}

pub fn token_rows(
    cost_basis: &HashMap<String, CostBasisEntry>,
    tokens: &[EnrichedToken]
) -> Vec<TokenPnlRow> {
    let mut rows: Vec<TokenPnlRow> = cost_basis
        .values()
        .map(|entry| {
            let token = find_token(tokens, &entry.mint);
            TokenPnlRow {
                mint: entry.mint.clone(),
                symbol: token.and_then(|t| t.symbol.clone()),
                realized_sol: realized_pnl(entry),
                total_sol: token_total_pnl(entry, token),
                buys: entry.buy_count(),
                sells: entry.sell_count(),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.realized_sol.partial_cmp(&a.realized_sol).unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ TokenAccount, Trade };

    const MINT_M: &str = "MintM";

    fn entry(bought: f64, sold: f64, spent: f64, received: f64) -> CostBasisEntry {
        CostBasisEntry {
            mint: MINT_M.to_string(),
            bought,
            sold,
            sol_spent: spent,
            sol_received: received,
            trades: Vec::new(),
            transfers: Vec::new(),
        }
    }

    fn token_with_price(price_native: f64) -> EnrichedToken {
        let mut token = EnrichedToken::placeholder(
            &(TokenAccount { mint: MINT_M.to_string(), balance: 0.0, decimals: 6 })
        );
        token.symbol = Some("M".to_string());
        token.price_native = price_native;
        token
    }

    #[test]
    fn unrealized_marks_open_position_at_current_price() {
        // Bought 1,000,000 for 10 SOL (avg 0.00001), price now 0.00002
        let entry = entry(1_000_000.0, 0.0, 10.0, 0.0);
        let token = token_with_price(0.00002);

        let total = token_total_pnl(&entry, Some(&token));
        assert!((total - 10.0).abs() < 1e-9);
        assert_eq!(realized_pnl(&entry), -10.0);
    }

    #[test]
    fn fully_exited_position_ignores_price() {
        let entry = entry(100.0, 100.0, 5.0, 8.0);
        assert_eq!(token_total_pnl(&entry, None), 3.0);
        // Even with a price available there is nothing left to mark
        let token = token_with_price(123.0);
        assert_eq!(token_total_pnl(&entry, Some(&token)), 3.0);
    }

    #[test]
    fn missing_or_zero_price_collapses_to_realized() {
        let entry = entry(100.0, 10.0, 5.0, 1.0);
        assert_eq!(token_total_pnl(&entry, None), -4.0);
        let token = token_with_price(0.0);
        assert_eq!(token_total_pnl(&entry, Some(&token)), -4.0);
    }

    #[test]
    fn partial_sell_does_not_double_count_cost() {
        // Bought 100 for 10 SOL (avg 0.1), sold 40 for 8 SOL, price now 0.3
        let entry = entry(100.0, 40.0, 10.0, 8.0);
        let token = token_with_price(0.3);

        // Realized on the sold 40: 8 - 4 = 4; unrealized on the held 60:
        // 18 - 6 = 12
        let total = token_total_pnl(&entry, Some(&token));
        assert!((total - 16.0).abs() < 1e-9);
        // Ledger form still reports the whole flow
        assert_eq!(realized_pnl(&entry), -2.0);
    }

    #[test]
    fn win_rate_zero_entries_is_zero() {
        let cb: HashMap<String, CostBasisEntry> = HashMap::new();
        let summary = summarize(&cb, &[]);
        assert_eq!(summary.win_rate_pct, 0.0);
        assert_eq!(summary.tokens_traded, 0);
        assert!(summary.best_trade.is_none());
    }

    #[test]
    fn aggregates_keep_realized_and_total_distinct() {
        let mut cb = HashMap::new();
        cb.insert(MINT_M.to_string(), entry(1_000_000.0, 0.0, 10.0, 0.0));
        let tokens = vec![token_with_price(0.00002)];

        // Realized-only sum ignores the open position entirely
        assert_eq!(portfolio_realized_pnl(&cb), -10.0);
        assert!((portfolio_total_pnl(&cb, &tokens) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn best_trade_prefers_highest_sell() {
        let mut e = entry(100.0, 60.0, 5.0, 9.0);
        e.trades.push(Trade {
            kind: TradeKind::Sell,
            amount: 10.0,
            sol_amount: 2.0,
            timestamp: 1,
            signature: "s1".to_string(),
        });
        e.trades.push(Trade {
            kind: TradeKind::Sell,
            amount: 50.0,
            sol_amount: 7.0,
            timestamp: 2,
            signature: "s2".to_string(),
        });
        e.trades.push(Trade {
            kind: TradeKind::Buy,
            amount: 100.0,
            sol_amount: 5.0,
            timestamp: 0,
            signature: "s0".to_string(),
        });

        let mut cb = HashMap::new();
        cb.insert(MINT_M.to_string(), e);

        let best = best_trade(&cb, &[]).unwrap();
        assert_eq!(best.sol, 7.0);
        assert_eq!(best.signature.as_deref(), Some("s2"));
    }

    #[test]
    fn best_trade_falls_back_to_total_pnl_without_sells() {
        let mut cb = HashMap::new();
        cb.insert(MINT_M.to_string(), entry(1_000_000.0, 0.0, 10.0, 0.0));
        let tokens = vec![token_with_price(0.00002)];

        let best = best_trade(&cb, &tokens).unwrap();
        // No sells exist: the unrealized-profitable position wins
        assert!((best.sol - 10.0).abs() < 1e-9);
        assert!(best.signature.is_none());
        assert_eq!(best.symbol.as_deref(), Some("M"));
    }

    #[test]
    fn summary_counts_winners_by_total_pnl() {
        let mut cb = HashMap::new();
        cb.insert(MINT_M.to_string(), entry(1_000_000.0, 0.0, 10.0, 0.0));
        cb.insert("loser".to_string(), CostBasisEntry {
            mint: "loser".to_string(),
            ..entry(0.0, 0.0, 4.0, 1.0)
        });
        let tokens = vec![token_with_price(0.00002)];

        let summary = summarize(&cb, &tokens);
        // MintM is up 10 SOL unrealized despite negative realized flow
        assert_eq!(summary.winning_tokens, 1);
        assert_eq!(summary.tokens_traded, 2);
        assert_eq!(summary.win_rate_pct, 50.0);
        assert_eq!(summary.net_realized_sol, -13.0);
        assert_eq!(summary.total_spent_sol, 14.0);
        assert_eq!(summary.total_received_sol, 1.0);
    }
}
