/// Cost-basis engine.
///
/// Consumes the full swap and transfer history of a wallet and produces a
/// per-mint ledger of SOL spent acquiring and recovered selling each token.
/// Pure and synchronous: a function of its inputs, rebuilt from scratch on
/// every request rather than incrementally updated.
use crate::global::SOL_MINT;
use crate::rpc::lamports_to_sol;
use crate::types::{
    CostBasisEntry,
    SwapTransaction,
    Trade,
    TradeKind,
    TransferDirection,
    TransferRecord,
    TransferTransaction,
};
use std::collections::HashMap;

/// Build the per-mint cost basis for a wallet.
///
/// Per swap, the wallet's total SOL outflow and inflow are computed first:
/// direct native transfers plus any wrapped-SOL token legs, since a swap
/// may route SOL through its SPL representation instead of a balance
/// change. The transaction's SOL flow is then attributed evenly across the
/// wallet's positive-amount token legs (`1 / num_moves` each). The even
/// split is the deliberate tie-break for multi-leg routes and must stay
/// exact for output compatibility; no per-leg price weighting.
pub fn build_cost_basis(
    swaps: &[SwapTransaction],
    transfers: &[TransferTransaction],
    wallet: &str
) -> HashMap<String, CostBasisEntry> {
    let mut entries: HashMap<String, CostBasisEntry> = HashMap::new();

    for tx in swaps {
        // A swap with no token legs contributes nothing
        if tx.token_transfers.is_empty() {
            continue;
        }

        let mut sol_out = 0.0;
        let mut sol_in = 0.0;
        for nt in &tx.native_transfers {
            if nt.from_user_account == wallet {
                sol_out += lamports_to_sol(nt.amount);
            }
            if nt.to_user_account == wallet {
                sol_in += lamports_to_sol(nt.amount);
            }
        }
        for tt in &tx.token_transfers {
            if tt.mint == SOL_MINT {
                if tt.from_user_account == wallet {
                    sol_out += tt.token_amount;
                }
                if tt.to_user_account == wallet {
                    sol_in += tt.token_amount;
                }
            }
        }

        // The wrapped-SOL mint is never itself a tradeable position
        let token_moves: Vec<&crate::types::TokenTransfer> = tx.token_transfers
            .iter()
            .filter(|tt| !tt.mint.is_empty() && tt.mint != SOL_MINT)
            .collect();

        // Zero-amount legs (rent-exempt account artifacts) must not dilute
        // the split
        let num_moves = token_moves
            .iter()
            .filter(|tt| {
                (tt.to_user_account == wallet || tt.from_user_account == wallet) &&
                    tt.token_amount > 0.0
            })
            .count()
            .max(1);
        let share = 1.0 / (num_moves as f64);

        for tt in token_moves {
            let entry = entries
                .entry(tt.mint.clone())
                .or_insert_with(|| CostBasisEntry::new(&tt.mint));

            let amount = tt.token_amount;
            if amount <= 0.0 {
                continue;
            }

            if tt.to_user_account == wallet {
                let cost = sol_out * share;
                entry.bought += amount;
                entry.sol_spent += cost;
                entry.trades.push(Trade {
                    kind: TradeKind::Buy,
                    amount,
                    sol_amount: cost,
                    timestamp: tx.timestamp,
                    signature: tx.signature.clone(),
                });
            } else if tt.from_user_account == wallet {
                let proceeds = sol_in * share;
                entry.sold += amount;
                entry.sol_received += proceeds;
                entry.trades.push(Trade {
                    kind: TradeKind::Sell,
                    amount,
                    sol_amount: proceeds,
                    timestamp: tx.timestamp,
                    signature: tx.signature.clone(),
                });
            }
        }
    }

    for tx in transfers {
        for tt in &tx.token_transfers {
            if tt.mint.is_empty() || tt.mint == SOL_MINT {
                continue;
            }

            let entry = entries
                .entry(tt.mint.clone())
                .or_insert_with(|| CostBasisEntry::new(&tt.mint));

            let amount = tt.token_amount;
            if tt.to_user_account == wallet && amount > 0.0 {
                entry.transfers.push(TransferRecord {
                    direction: TransferDirection::In,
                    amount,
                    timestamp: tx.timestamp,
                    signature: tx.signature.clone(),
                });
            } else if tt.from_user_account == wallet && amount > 0.0 {
                entry.transfers.push(TransferRecord {
                    direction: TransferDirection::Out,
                    amount,
                    timestamp: tx.timestamp,
                    signature: tx.signature.clone(),
                });
            }
        }
    }

    entries
}
