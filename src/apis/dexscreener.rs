/// DexScreener API client.
///
/// Batched pair lookups are capped at 30 mints per request with inter-batch
/// delays to stay inside the public rate limits; every endpoint degrades to
/// an empty result set on failure.
use crate::global::{ is_debug_api_enabled, SOL_MINT };
use crate::logger::{ log, LogTag };
use crate::types::MarketEntry;
use serde::Deserialize;
use std::time::Duration;

const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com";

/// Maximum tokens per batch request (DexScreener API constraint)
pub const MAX_TOKENS_PER_REQUEST: usize = 30;

/// Delay between batch requests
const BATCH_DELAY_MS: u64 = 350;

/// Delay between per-mint fallback requests
const FALLBACK_DELAY_MS: u64 = 200;

/// Request timeout - DexScreener is fast, 10s is sufficient
const TIMEOUT_SECS: u64 = 10;

pub struct DexScreenerClient {
    client: reqwest::Client,
}

impl DexScreenerClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client
                ::builder()
                .timeout(Duration::from_secs(TIMEOUT_SECS))
                .user_agent("solpnl/0.4")
                .build()
                .unwrap_or_default(),
        }
    }

    /// Batched pair lookup for a list of mints.
    ///
    /// Primary endpoint is the v1 batch route; when a batch comes back
    /// empty the per-mint legacy route is tried for each mint of that
    /// batch. Failures only shrink the result set.
    pub async fn token_pairs(&self, mints: &[String]) -> Vec<MarketEntry> {
        if mints.is_empty() {
            return Vec::new();
        }

        let mut entries = Vec::new();
        let chunk_count = mints.len().div_ceil(MAX_TOKENS_PER_REQUEST);

        for (chunk_idx, chunk) in mints.chunks(MAX_TOKENS_PER_REQUEST).enumerate() {
            let url = format!(
                "{}/tokens/v1/solana/{}",
                DEXSCREENER_BASE_URL,
                chunk.join(",")
            );

            let mut got_data = false;
            match self.fetch_pairs(&url).await {
                Ok(pairs) if !pairs.is_empty() => {
                    entries.extend(pairs.iter().map(RawPair::to_market_entry));
                    got_data = true;
                }
                Ok(_) => {}
                Err(e) => {
                    log(LogTag::Api, "WARNING", &format!("Batch {} failed: {}", chunk_idx + 1, e));
                }
            }

            // Fallback: legacy endpoint, one mint at a time
            if !got_data {
                for mint in chunk {
                    let url = format!("{}/latest/dex/tokens/{}", DEXSCREENER_BASE_URL, mint);
                    if let Ok(pairs) = self.fetch_pairs(&url).await {
                        entries.extend(pairs.iter().map(RawPair::to_market_entry));
                    }
                    tokio::time::sleep(Duration::from_millis(FALLBACK_DELAY_MS)).await;
                }
            }

            if chunk_idx + 1 < chunk_count {
                tokio::time::sleep(Duration::from_millis(BATCH_DELAY_MS)).await;
            }
        }

        if is_debug_api_enabled() {
            log(
                LogTag::Api,
                "DEBUG",
                &format!("Fetched {} pairs for {} mints", entries.len(), mints.len())
            );
        }

        entries
    }

    /// All pairs for a single mint (token detail view)
    pub async fn pairs_for_mint(&self, mint: &str) -> Vec<MarketEntry> {
        let url = format!("{}/token-pairs/v1/solana/{}", DEXSCREENER_BASE_URL, mint);
        match self.fetch_pairs(&url).await {
            Ok(pairs) if !pairs.is_empty() => {
                return pairs.iter().map(RawPair::to_market_entry).collect();
            }
            _ => {}
        }

        let url = format!("{}/latest/dex/tokens/{}", DEXSCREENER_BASE_URL, mint);
        match self.fetch_pairs(&url).await {
            Ok(pairs) => pairs.iter().map(RawPair::to_market_entry).collect(),
            Err(e) => {
                log(LogTag::Api, "WARNING", &format!("Pair lookup for {} failed: {}", mint, e));
                Vec::new()
            }
        }
    }

    /// Current SOL/USD price via the wrapped-SOL mint's first pair
    pub async fn sol_price_usd(&self) -> Option<f64> {
        let url = format!("{}/latest/dex/tokens/{}", DEXSCREENER_BASE_URL, SOL_MINT);
        if let Ok(pairs) = self.fetch_pairs(&url).await {
            if let Some(pair) = pairs.first() {
                let price = pair.price_usd_f64();
                if price > 0.0 {
                    return Some(price);
                }
            }
        }

        // Fallback to the v1 batch route
        let url = format!("{}/tokens/v1/solana/{}", DEXSCREENER_BASE_URL, SOL_MINT);
        match self.fetch_pairs(&url).await {
            Ok(pairs) => pairs.first().map(|p| p.price_usd_f64()).filter(|p| *p > 0.0),
            Err(_) => None,
        }
    }

    async fn fetch_pairs(&self, url: &str) -> Result<Vec<RawPair>, String> {
        let response = self.client
            .get(url)
            .send().await
            .map_err(|e| format!("request error: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }

        let payload: PairsPayload = response
            .json().await
            .map_err(|e| format!("decode error: {}", e))?;

        Ok(match payload {
            PairsPayload::List(pairs) => pairs,
            PairsPayload::Object { pairs } => pairs.unwrap_or_default(),
        })
    }
}

impl Default for DexScreenerClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// RAW WIRE TYPES
// ============================================================================

/// The batch/v1 routes return a bare array, the legacy route wraps it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PairsPayload {
    List(Vec<RawPair>),
    Object {
        pairs: Option<Vec<RawPair>>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPair {
    url: Option<String>,
    pair_address: Option<String>,
    base_token: Option<RawPairToken>,
    quote_token: Option<RawPairToken>,
    price_native: Option<String>,
    price_usd: Option<String>,
    volume: Option<RawTimeframes>,
    price_change: Option<RawTimeframes>,
    liquidity: Option<RawLiquidity>,
    fdv: Option<f64>,
    market_cap: Option<f64>,
    info: Option<RawPairInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPairToken {
    address: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeframes {
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLiquidity {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPairInfo {
    image_url: Option<String>,
}

impl RawPair {
    fn price_usd_f64(&self) -> f64 {
        self.price_usd
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    fn to_market_entry(&self) -> MarketEntry {
        let (base_mint, base_symbol, base_name) = token_side(&self.base_token);
        let (quote_mint, quote_symbol, quote_name) = token_side(&self.quote_token);

        MarketEntry {
            base_mint,
            base_symbol,
            base_name,
            quote_mint,
            quote_symbol,
            quote_name,
            price_usd: self.price_usd_f64(),
            price_native: self.price_native
                .as_deref()
                .and_then(|s| s.parse::<f64>().ok())
                .unwrap_or(0.0),
            price_change_h24: self.price_change.as_ref().and_then(|v| v.h24).unwrap_or(0.0),
            volume_h24: self.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0),
            liquidity_usd: self.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0),
            // DexScreener omits marketCap for some pairs; FDV stands in
            market_cap: self.market_cap.or(self.fdv).unwrap_or(0.0),
            image_url: self.info.as_ref().and_then(|i| i.image_url.clone()),
            pair_address: self.pair_address.clone(),
            pair_url: self.url.clone(),
        }
    }
}

fn token_side(token: &Option<RawPairToken>) -> (String, String, String) {
    match token {
        Some(t) =>
            (
                t.address.clone().unwrap_or_default(),
                t.symbol.clone().unwrap_or_default(),
                t.name.clone().unwrap_or_default(),
            ),
        None => (String::new(), String::new(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR_JSON: &str =
        r#"{
        "chainId": "solana",
        "dexId": "raydium",
        "url": "https://dexscreener.com/solana/pair1",
        "pairAddress": "pair1",
        "baseToken": { "address": "MintA", "name": "Token A", "symbol": "TKA" },
        "quoteToken": { "address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL" },
        "priceNative": "0.0000234",
        "priceUsd": "0.00351",
        "volume": { "h24": 120000.5, "h6": 30000.0 },
        "priceChange": { "h24": -12.4 },
        "liquidity": { "usd": 54000.0, "base": 1.0, "quote": 2.0 },
        "fdv": 3500000.0,
        "info": { "imageUrl": "https://img.example/a.png" }
    }"#;

    #[test]
    fn converts_raw_pair_to_market_entry() {
        let raw: RawPair = serde_json::from_str(PAIR_JSON).unwrap();
        let entry = raw.to_market_entry();
        assert_eq!(entry.base_mint, "MintA");
        assert_eq!(entry.base_symbol, "TKA");
        assert_eq!(entry.quote_symbol, "SOL");
        assert_eq!(entry.price_usd, 0.00351);
        assert_eq!(entry.price_native, 0.0000234);
        assert_eq!(entry.price_change_h24, -12.4);
        assert_eq!(entry.volume_h24, 120000.5);
        assert_eq!(entry.liquidity_usd, 54000.0);
        // marketCap absent, FDV stands in
        assert_eq!(entry.market_cap, 3500000.0);
        assert_eq!(entry.pair_address.as_deref(), Some("pair1"));
    }

    #[test]
    fn decodes_both_payload_shapes() {
        let bare = format!("[{}]", PAIR_JSON);
        let wrapped = format!(r#"{{ "schemaVersion": "1.0.0", "pairs": [{}] }}"#, PAIR_JSON);

        let list: PairsPayload = serde_json::from_str(&bare).unwrap();
        let object: PairsPayload = serde_json::from_str(&wrapped).unwrap();

        match list {
            PairsPayload::List(pairs) => assert_eq!(pairs.len(), 1),
            _ => panic!("expected bare list"),
        }
        match object {
            PairsPayload::Object { pairs } => assert_eq!(pairs.unwrap().len(), 1),
            _ => panic!("expected wrapped object"),
        }
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let raw: RawPair = serde_json::from_str(r#"{ "pairAddress": "p" }"#).unwrap();
        let entry = raw.to_market_entry();
        assert_eq!(entry.price_usd, 0.0);
        assert_eq!(entry.liquidity_usd, 0.0);
        assert_eq!(entry.market_cap, 0.0);
        assert!(entry.base_mint.is_empty());
    }
}
