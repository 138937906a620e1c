/// Dashboard orchestration.
///
/// Assembles the per-wallet views from the transport adapters and renders
/// them as logger output. Failures here follow the error design: only the
/// SOL balance fetch can fail a wallet section; everything else degrades to
/// empty data, and one wallet failing never touches the other.
use crate::apis::dexscreener::DexScreenerClient;
use crate::apis::helius::HeliusClient;
use crate::costbasis::build_cost_basis;
use crate::errors::DashboardError;
use crate::global::{ is_debug_pnl_enabled, Configs };
use crate::history::{ build_time_series, DEFAULT_BUCKET_SECS };
use crate::holdings::resolve;
use crate::logger::{ log, log_plain, LogTag };
use crate::pnl::{ summarize, token_rows, PnlSummary };
use crate::rpc::{ validate_wallet_address, RpcClient };
use crate::snapshot::{ build_snapshot, ComparisonWinner, SnapshotComparison };
use crate::types::{ CostBasisEntry, EnrichedToken, PortfolioSnapshot, PriceQuote };
use chrono::Utc;
use std::collections::HashMap;

/// Everything needed to render one wallet's holdings section
#[derive(Debug, Clone)]
pub struct WalletView {
    pub wallet: String,
    pub sol_balance: f64,
    pub tokens: Vec<EnrichedToken>,
    pub snapshot: PortfolioSnapshot,
}

/// Everything needed to render one wallet's PnL section
#[derive(Debug, Clone)]
pub struct WalletPnl {
    pub cost_basis: HashMap<String, CostBasisEntry>,
    pub summary: PnlSummary,
}

/// Load the holdings view for a wallet: balance, token accounts across both
/// token programs, market enrichment, snapshot.
pub async fn load_wallet_view(
    rpc: &RpcClient,
    dex: &DexScreenerClient,
    wallet: &str,
    sol_price: f64
) -> Result<WalletView, DashboardError> {
    validate_wallet_address(wallet)?;

    let sol_balance = rpc.get_sol_balance(wallet).await?;

    let accounts = rpc.get_token_accounts(wallet).await;
    let mints: Vec<String> = accounts
        .iter()
        .map(|a| a.mint.clone())
        .collect();
    let market_data = dex.token_pairs(&mints).await;
    let tokens = resolve(&accounts, &market_data);

    log(
        LogTag::Holdings,
        "SUCCESS",
        &format!(
            "{}: {:.4} SOL, {} tokens ({} with market data)",
            short_addr(wallet),
            sol_balance,
            tokens.len(),
            tokens
                .iter()
                .filter(|t| t.price_usd > 0.0)
                .count()
        )
    );

    let snapshot = build_snapshot(&tokens, sol_balance, sol_price);
    Ok(WalletView {
        wallet: wallet.to_string(),
        sol_balance,
        tokens,
        snapshot,
    })
}

/// Load the PnL view for a wallet. Swap and transfer history share no
/// cursor state, so the two paginated fetches run concurrently; each is
/// strictly sequential internally.
pub async fn load_wallet_pnl(
    helius: &HeliusClient,
    tokens: &[EnrichedToken],
    wallet: &str,
    swap_page_cap: usize,
    transfer_page_cap: usize
) -> WalletPnl {
    let (swaps, transfers) = tokio::join!(
        helius.fetch_swaps(wallet, swap_page_cap),
        helius.fetch_transfers(wallet, transfer_page_cap)
    );

    let cost_basis = build_cost_basis(&swaps, &transfers, wallet);
    let summary = summarize(&cost_basis, tokens);

    if is_debug_pnl_enabled() {
        for entry in cost_basis.values() {
            log(
                LogTag::Pnl,
                "DEBUG",
                &format!(
                    "{}: bought {:.2} sold {:.2} spent {:.4} received {:.4} ({} trades)",
                    short_addr(&entry.mint),
                    entry.bought,
                    entry.sold,
                    entry.sol_spent,
                    entry.sol_received,
                    entry.trades.len()
                )
            );
        }
    }

    log(
        LogTag::CostBasis,
        "SUCCESS",
        &format!(
            "{}: {} swaps + {} transfers -> {} tokens traded, {} trades",
            short_addr(wallet),
            swaps.len(),
            transfers.len(),
            summary.tokens_traded,
            summary.total_trades
        )
    );

    WalletPnl { cost_basis, summary }
}

/// Load view + PnL for a comparison wallet. Returns None (with an error
/// log) instead of failing the caller: the primary section is unaffected.
pub async fn load_comparison_wallet(
    rpc: &RpcClient,
    dex: &DexScreenerClient,
    helius: &HeliusClient,
    configs: &Configs,
    wallet: &str,
    sol_price: f64
) -> Option<(WalletView, WalletPnl)> {
    match load_wallet_view(rpc, dex, wallet, sol_price).await {
        Ok(view) => {
            // Shallower history for the guest wallet keeps the comparison quick
            let pnl = load_wallet_pnl(
                helius,
                &view.tokens,
                wallet,
                (configs.swap_page_cap / 2).max(1),
                (configs.transfer_page_cap / 2).max(1)
            ).await;
            Some((view, pnl))
        }
        Err(e) => {
            log(
                LogTag::Snapshot,
                "ERROR",
                &format!("Comparison wallet {} failed: {}", short_addr(wallet), e)
            );
            None
        }
    }
}

fn short_addr(address: &str) -> String {
    if address.len() > 8 {
        format!("{}..{}", &address[..4], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

// ============================================================================
// TERMINAL RENDERING
// ============================================================================

/// Render the full wallet summary through the logger
pub fn log_wallet_summary(view: &WalletView, pnl: &WalletPnl, quote: &PriceQuote) {
    let snapshot = &view.snapshot;

    log_plain("");
    log(LogTag::Snapshot, "PORTFOLIO", &format!("Wallet {}", view.wallet));
    log_plain(
        &format!(
            "  Total value:   ${:.2}  (SOL {:.4} + tokens ${:.2})",
            snapshot.total_value,
            snapshot.sol_balance,
            snapshot.token_value
        )
    );
    log_plain(
        &format!(
            "  Tokens held:   {}  (top holding {:.1}%, avg ${:.2})",
            snapshot.token_count,
            snapshot.top_holding_pct,
            snapshot.avg_token_value
        )
    );
    if quote.is_unset() {
        log_plain("  SOL price:     unavailable");
    } else {
        log_plain(&format!("  SOL price:     ${:.2} (as of {})", quote.price_usd, quote.as_of));
    }

    let summary = &pnl.summary;
    if summary.tokens_traded > 0 {
        log_plain(
            &format!(
                "  Net PnL:       {:+.4} SOL realized  (spent {:.2}, received {:.2})",
                summary.net_realized_sol,
                summary.total_spent_sol,
                summary.total_received_sol
            )
        );
        log_plain(
            &format!(
                "  Win rate:      {:.1}%  ({}/{} tokens, {} trades)",
                summary.win_rate_pct,
                summary.winning_tokens,
                summary.tokens_traded,
                summary.total_trades
            )
        );
        if let Some(best) = &summary.best_trade {
            log_plain(
                &format!(
                    "  Best trade:    {:+.4} SOL on {}",
                    best.sol,
                    best.symbol.clone().unwrap_or_else(|| short_addr(&best.mint))
                )
            );
        }

        let rows = token_rows(&pnl.cost_basis, &view.tokens);
        for row in rows.iter().take(10) {
            log_plain(
                &format!(
                    "    {:<12} {:+.4} SOL realized  {:+.4} total  ({}B/{}S)",
                    row.symbol.clone().unwrap_or_else(|| short_addr(&row.mint)),
                    row.realized_sol,
                    row.total_sol,
                    row.buys,
                    row.sells
                )
            );
        }
    } else {
        log_plain("  Net PnL:       no cost-basis data (indexer key missing or no history)");
    }
    log_plain("");
}

/// Render the replayed history tail (last few buckets)
pub fn log_history_tail(view: &WalletView, pnl: &WalletPnl, start_ts: i64) {
    let points = build_time_series(
        &pnl.cost_basis,
        &view.tokens,
        view.sol_balance,
        start_ts,
        Utc::now().timestamp(),
        DEFAULT_BUCKET_SECS
    );
    if points.is_empty() {
        return;
    }

    log(
        LogTag::Pnl,
        "HISTORY",
        &format!("{} buckets since epoch {} (today's prices applied retroactively)", points.len(), start_ts)
    );
    for point in points.iter().rev().take(6).rev() {
        log_plain(
            &format!(
                "    ts {}  SOL {:.4}  tokens {:.4}  total {:.4}",
                point.ts,
                point.sol_balance,
                point.token_value_sol,
                point.total_sol
            )
        );
    }
}

/// Render a head-to-head comparison
pub fn log_comparison(primary_wallet: &str, challenger_wallet: &str, result: &SnapshotComparison) {
    let verdict = match result.winner {
        ComparisonWinner::Primary => format!("{} leads", short_addr(primary_wallet)),
        ComparisonWinner::Challenger => format!("{} leads", short_addr(challenger_wallet)),
        ComparisonWinner::Tie => "tied".to_string(),
    };
    log(
        LogTag::Snapshot,
        "COMPARE",
        &format!(
            "{} vs {}: {} ({} to {} across {} metrics)",
            short_addr(primary_wallet),
            short_addr(challenger_wallet),
            verdict,
            result.primary_wins,
            result.challenger_wins,
            result.metrics.len()
        )
    );
    for m in &result.metrics {
        let marker = if m.primary_wins { "<" } else { ">" };
        log_plain(
            &format!("    {:<16} {:>14.4} {} {:>14.4}", m.label, m.primary, marker, m.challenger)
        );
    }
}
