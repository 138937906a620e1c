/// Portfolio snapshot and head-to-head comparison.
use crate::types::{ EnrichedToken, PortfolioSnapshot };
use serde::Serialize;

/// Pure aggregation over enriched holdings.
///
/// Total value is token USD value plus SOL at the given price; the top
/// holding percentage is measured against token-only value and is 0 when
/// there are no tokens.
pub fn build_snapshot(
    tokens: &[EnrichedToken],
    sol_balance: f64,
    sol_price: f64
) -> PortfolioSnapshot {
    let token_value: f64 = tokens
        .iter()
        .map(|t| t.usd_value())
        .sum();
    let sol_value = sol_balance * sol_price;

    let top_value = tokens
        .iter()
        .map(|t| t.usd_value())
        .fold(0.0, f64::max);
    let top_holding_pct = if token_value > 0.0 { (top_value / token_value) * 100.0 } else { 0.0 };
    let avg_token_value = if tokens.is_empty() {
        0.0
    } else {
        token_value / (tokens.len() as f64)
    };

    PortfolioSnapshot {
        total_value: token_value + sol_value,
        sol_balance,
        token_count: tokens.len(),
        token_value,
        top_holding_pct,
        avg_token_value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ComparisonWinner {
    Primary,
    Challenger,
    Tie,
}

/// One compared metric. `primary_wins` is a strict-greater test; PnL rows
/// compare absolute magnitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricComparison {
    pub label: &'static str,
    pub primary: f64,
    pub challenger: f64,
    pub primary_wins: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotComparison {
    pub metrics: Vec<MetricComparison>,
    pub primary_wins: usize,
    pub challenger_wins: usize,
    pub winner: ComparisonWinner,
}

/// Metric-by-metric magnitude comparison with a simple majority-count
/// winner, no statistical weighting. The optional PnL pair adds two rows
/// (net realized SOL, tokens traded) only when both sides have cost-basis
/// data.
pub fn compare(
    primary: &PortfolioSnapshot,
    challenger: &PortfolioSnapshot,
    primary_pnl: Option<(f64, usize)>,
    challenger_pnl: Option<(f64, usize)>
) -> SnapshotComparison {
    let mut metrics = vec![
        metric("Portfolio Value", primary.total_value, challenger.total_value, false),
        metric("SOL Balance", primary.sol_balance, challenger.sol_balance, false),
        metric("Token Count", primary.token_count as f64, challenger.token_count as f64, false),
        metric("Token Value", primary.token_value, challenger.token_value, false),
        metric("Top Holding %", primary.top_holding_pct, challenger.top_holding_pct, false),
        metric("Avg Token Value", primary.avg_token_value, challenger.avg_token_value, false)
    ];

    if let (Some((p_pnl, p_traded)), Some((c_pnl, c_traded))) = (primary_pnl, challenger_pnl) {
        metrics.push(metric("Net PnL (SOL)", p_pnl, c_pnl, true));
        metrics.push(metric("Tokens Traded", p_traded as f64, c_traded as f64, false));
    }

    let primary_wins = metrics
        .iter()
        .filter(|m| m.primary_wins)
        .count();
    let challenger_wins = metrics.len() - primary_wins;

    let winner = if primary_wins > challenger_wins {
        ComparisonWinner::Primary
    } else if primary_wins < challenger_wins {
        ComparisonWinner::Challenger
    } else {
        ComparisonWinner::Tie
    };

    SnapshotComparison { metrics, primary_wins, challenger_wins, winner }
}

fn metric(label: &'static str, primary: f64, challenger: f64, by_magnitude: bool) -> MetricComparison {
    let primary_wins = if by_magnitude {
        primary.abs() > challenger.abs()
    } else {
        primary > challenger
    };
    MetricComparison { label, primary, challenger, primary_wins }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenAccount;

    fn token(mint: &str, balance: f64, price_usd: f64) -> EnrichedToken {
        let mut token = EnrichedToken::placeholder(
            &(TokenAccount { mint: mint.to_string(), balance, decimals: 6 })
        );
        token.price_usd = price_usd;
        token
    }

    #[test]
    fn snapshot_aggregates_values() {
        let tokens = vec![token("A", 10.0, 2.0), token("B", 5.0, 4.0)];
        let snapshot = build_snapshot(&tokens, 3.0, 100.0);

        assert_eq!(snapshot.token_value, 40.0);
        assert_eq!(snapshot.total_value, 340.0);
        assert_eq!(snapshot.token_count, 2);
        assert_eq!(snapshot.top_holding_pct, 50.0);
        assert_eq!(snapshot.avg_token_value, 20.0);
        assert_eq!(snapshot.sol_balance, 3.0);
    }

    #[test]
    fn empty_portfolio_has_zeroed_ratios() {
        let snapshot = build_snapshot(&[], 1.0, 100.0);
        assert_eq!(snapshot.token_value, 0.0);
        assert_eq!(snapshot.top_holding_pct, 0.0);
        assert_eq!(snapshot.avg_token_value, 0.0);
        assert_eq!(snapshot.total_value, 100.0);
    }

    #[test]
    fn larger_total_value_wins_that_metric() {
        let a = build_snapshot(&[token("A", 1.0, 100.0)], 0.0, 0.0);
        let b = build_snapshot(&[token("B", 1.0, 50.0)], 0.0, 0.0);

        let result = compare(&a, &b, None, None);
        let total = result.metrics
            .iter()
            .find(|m| m.label == "Portfolio Value")
            .unwrap();
        assert_eq!(total.primary, 100.0);
        assert_eq!(total.challenger, 50.0);
        assert!(total.primary_wins);
    }

    #[test]
    fn pnl_rows_only_with_both_sides() {
        let a = build_snapshot(&[], 1.0, 1.0);
        let b = build_snapshot(&[], 2.0, 1.0);

        let without = compare(&a, &b, Some((1.0, 3)), None);
        assert_eq!(without.metrics.len(), 6);

        let with = compare(&a, &b, Some((-5.0, 3)), Some((2.0, 1)));
        assert_eq!(with.metrics.len(), 8);
        // PnL compares magnitude: -5 beats +2
        let pnl = with.metrics
            .iter()
            .find(|m| m.label == "Net PnL (SOL)")
            .unwrap();
        assert!(pnl.primary_wins);
    }

    #[test]
    fn majority_count_determines_winner() {
        let a = build_snapshot(&[token("A", 1.0, 100.0), token("B", 1.0, 50.0)], 5.0, 1.0);
        let b = build_snapshot(&[token("C", 1.0, 10.0)], 1.0, 1.0);

        let result = compare(&a, &b, None, None);
        assert_eq!(result.winner, ComparisonWinner::Primary);
        assert_eq!(result.primary_wins + result.challenger_wins, result.metrics.len());
    }
}
