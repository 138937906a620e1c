/// Holdings resolver: merges raw token accounts with DexScreener market
/// data into enriched token views.
use crate::types::{ EnrichedToken, MarketEntry, TokenAccount };

/// Resolve each account against the market data.
///
/// Candidate pairs are those referencing the mint on either side. Base-side
/// matches are preferred (price semantics are base-denominated); among the
/// preferred set the highest-liquidity pair wins, deterministically. A mint
/// matched only as the quote side keeps its symbol but degrades price
/// fields to zero: the available price is denominated in the wrong
/// direction, and that information loss is accepted rather than guessed
/// around. No match yields a zeroed placeholder; holdings are never
/// dropped.
pub fn resolve(accounts: &[TokenAccount], market_data: &[MarketEntry]) -> Vec<EnrichedToken> {
    accounts
        .iter()
        .map(|account| {
            match best_match(&account.mint, market_data) {
                Some(entry) => enrich(account, entry),
                None => EnrichedToken::placeholder(account),
            }
        })
        .collect()
}

/// Best pair for a mint: base-side matches first, then highest liquidity
fn best_match<'a>(mint: &str, market_data: &'a [MarketEntry]) -> Option<&'a MarketEntry> {
    let matches: Vec<&MarketEntry> = market_data
        .iter()
        .filter(|p| p.base_mint == mint || p.quote_mint == mint)
        .collect();

    let base_matches: Vec<&MarketEntry> = matches
        .iter()
        .copied()
        .filter(|p| p.base_mint == mint)
        .collect();

    let candidates = if base_matches.is_empty() { matches } else { base_matches };

    candidates
        .into_iter()
        .max_by(|a, b| {
            a.liquidity_usd.partial_cmp(&b.liquidity_usd).unwrap_or(std::cmp::Ordering::Equal)
        })
}

fn enrich(account: &TokenAccount, entry: &MarketEntry) -> EnrichedToken {
    let is_base = entry.base_mint == account.mint;
    let (symbol, name) = if is_base {
        (entry.base_symbol.clone(), entry.base_name.clone())
    } else {
        (entry.quote_symbol.clone(), entry.quote_name.clone())
    };

    EnrichedToken {
        mint: account.mint.clone(),
        balance: account.balance,
        decimals: account.decimals,
        symbol: if symbol.is_empty() { None } else { Some(symbol) },
        name: if name.is_empty() { None } else { Some(name) },
        price_usd: if is_base { entry.price_usd } else { 0.0 },
        price_native: if is_base { entry.price_native } else { 0.0 },
        price_change_h24: entry.price_change_h24,
        volume_h24: entry.volume_h24,
        liquidity_usd: entry.liquidity_usd,
        market_cap: entry.market_cap,
        image_url: entry.image_url.clone(),
        pair_address: entry.pair_address.clone(),
        pair_url: entry.pair_url.clone(),
    }
}

/// Lightweight price refresh for already-enriched tokens.
///
/// Only base-side matches update a token; tokens without a fresh match keep
/// their previous values.
pub fn refresh_prices(tokens: Vec<EnrichedToken>, market_data: &[MarketEntry]) -> Vec<EnrichedToken> {
    tokens
        .into_iter()
        .map(|mut token| {
            let best = market_data
                .iter()
                .filter(|p| p.base_mint == token.mint)
                .max_by(|a, b| {
                    a.liquidity_usd
                        .partial_cmp(&b.liquidity_usd)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

            if let Some(entry) = best {
                token.price_usd = entry.price_usd;
                token.price_native = entry.price_native;
                token.price_change_h24 = entry.price_change_h24;
                token.volume_h24 = entry.volume_h24;
                token.market_cap = entry.market_cap;
                if entry.image_url.is_some() {
                    token.image_url = entry.image_url.clone();
                }
                if entry.pair_address.is_some() {
                    token.pair_address = entry.pair_address.clone();
                }
            }
            token
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(mint: &str, balance: f64) -> TokenAccount {
        TokenAccount { mint: mint.to_string(), balance, decimals: 6 }
    }

    fn pair(base: &str, quote: &str, liquidity: f64, price_usd: f64) -> MarketEntry {
        MarketEntry {
            base_mint: base.to_string(),
            base_symbol: format!("{}SYM", base),
            base_name: format!("{} Name", base),
            quote_mint: quote.to_string(),
            quote_symbol: format!("{}SYM", quote),
            quote_name: format!("{} Name", quote),
            price_usd,
            price_native: price_usd / 100.0,
            price_change_h24: 1.0,
            volume_h24: 10.0,
            liquidity_usd: liquidity,
            market_cap: 1000.0,
            image_url: None,
            pair_address: Some(format!("{}-{}", base, quote)),
            pair_url: None,
        }
    }

    #[test]
    fn base_side_match_preferred_over_quote_side() {
        let accounts = vec![account("M1", 10.0)];
        // Quote-side pair has far higher liquidity, base-side must still win
        let market = vec![pair("OTHER", "M1", 1_000_000.0, 5.0), pair("M1", "SOL", 100.0, 2.0)];

        let enriched = resolve(&accounts, &market);
        assert_eq!(enriched[0].price_usd, 2.0);
        assert_eq!(enriched[0].symbol.as_deref(), Some("M1SYM"));
    }

    #[test]
    fn highest_liquidity_wins_among_base_matches() {
        let accounts = vec![account("M1", 10.0)];
        let market = vec![
            pair("M1", "SOL", 100.0, 1.0),
            pair("M1", "USDC", 9000.0, 3.0),
            pair("M1", "SOL", 500.0, 2.0)
        ];

        let enriched = resolve(&accounts, &market);
        assert_eq!(enriched[0].price_usd, 3.0);
        assert_eq!(enriched[0].pair_address.as_deref(), Some("M1-USDC"));
    }

    #[test]
    fn quote_only_match_degrades_price_to_zero() {
        let accounts = vec![account("M1", 10.0)];
        let market = vec![pair("OTHER", "M1", 1000.0, 5.0)];

        let enriched = resolve(&accounts, &market);
        // Symbol survives, price does not: it is denominated the wrong way
        assert_eq!(enriched[0].symbol.as_deref(), Some("M1SYM"));
        assert_eq!(enriched[0].price_usd, 0.0);
        assert_eq!(enriched[0].price_native, 0.0);
        assert_eq!(enriched[0].liquidity_usd, 1000.0);
    }

    #[test]
    fn no_match_yields_placeholder_not_dropped() {
        let accounts = vec![account("M1", 42.0)];
        let enriched = resolve(&accounts, &[]);
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].balance, 42.0);
        assert_eq!(enriched[0].price_usd, 0.0);
        assert!(enriched[0].symbol.is_none());
    }

    #[test]
    fn refresh_keeps_values_without_fresh_match() {
        let accounts = vec![account("M1", 10.0)];
        let market = vec![pair("M1", "SOL", 100.0, 2.0)];
        let enriched = resolve(&accounts, &market);

        let refreshed = refresh_prices(enriched.clone(), &[]);
        assert_eq!(refreshed, enriched);

        let fresh = vec![pair("M1", "SOL", 100.0, 4.0)];
        let refreshed = refresh_prices(enriched, &fresh);
        assert_eq!(refreshed[0].price_usd, 4.0);
    }
}
