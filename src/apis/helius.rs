/// Helius enhanced-transaction indexer client.
///
/// History is cursor-paginated: each page is requested with the previous
/// page's last signature as `before`, so pages are strictly sequential per
/// wallet. Pagination ends naturally on a short page, or at the page cap to
/// bound latency against wallets with very long histories.
use crate::global::is_debug_api_enabled;
use crate::logger::{ log, LogTag };
use crate::types::{ NativeTransfer, SwapTransaction, TokenTransfer, TransferTransaction };
use serde::Deserialize;
use std::time::Duration;

/// Indexer page size; a shorter page means history is exhausted
const PAGE_SIZE: usize = 100;

/// Delay between page requests
const PAGE_DELAY_MS: u64 = 150;

const TIMEOUT_SECS: u64 = 30;

pub struct HeliusClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl HeliusClient {
    pub fn new(api_base: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client
                ::builder()
                .timeout(Duration::from_secs(TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Whether the indexer is usable at all; without a key the PnL section
    /// simply stays empty.
    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Swap history for a wallet, newest first, up to `max_pages` pages
    pub async fn fetch_swaps(&self, wallet: &str, max_pages: usize) -> Vec<SwapTransaction> {
        self.fetch_pages(wallet, "SWAP", max_pages).await
            .into_iter()
            .filter_map(|raw| {
                raw.into_parts().map(|(signature, timestamp, native, tokens)| SwapTransaction {
                    signature,
                    timestamp,
                    native_transfers: native,
                    token_transfers: tokens,
                })
            })
            .collect()
    }

    /// Non-swap transfer history for a wallet
    pub async fn fetch_transfers(
        &self,
        wallet: &str,
        max_pages: usize
    ) -> Vec<TransferTransaction> {
        self.fetch_pages(wallet, "TRANSFER", max_pages).await
            .into_iter()
            .filter_map(|raw| {
                raw.into_parts().map(|(signature, timestamp, native, tokens)| TransferTransaction {
                    signature,
                    timestamp,
                    native_transfers: native,
                    token_transfers: tokens,
                })
            })
            .collect()
    }

    async fn fetch_pages(
        &self,
        wallet: &str,
        kind: &str,
        max_pages: usize
    ) -> Vec<RawEnhancedTransaction> {
        if !self.has_key() {
            return Vec::new();
        }

        let mut all: Vec<RawEnhancedTransaction> = Vec::new();
        let mut last_signature: Option<String> = None;

        for page in 0..max_pages {
            let mut url = format!(
                "{}/addresses/{}/transactions?api-key={}&type={}",
                self.api_base,
                wallet,
                self.api_key,
                kind
            );
            if let Some(ref sig) = last_signature {
                url.push_str("&before=");
                url.push_str(sig);
            }

            let page_txns = match self.fetch_page(&url).await {
                Ok(txns) => txns,
                Err(e) => {
                    log(
                        LogTag::Indexer,
                        "WARNING",
                        &format!("{} page {} failed: {} - keeping {} fetched", kind, page + 1, e, all.len())
                    );
                    break;
                }
            };

            if page_txns.is_empty() {
                break;
            }

            let short_page = page_txns.len() < PAGE_SIZE;
            last_signature = page_txns.last().and_then(|t| t.signature.clone());
            all.extend(page_txns);

            // Natural termination: a short page means no older history
            if short_page || last_signature.is_none() {
                break;
            }

            tokio::time::sleep(Duration::from_millis(PAGE_DELAY_MS)).await;
        }

        if is_debug_api_enabled() {
            log(
                LogTag::Indexer,
                "DEBUG",
                &format!("Fetched {} {} transactions for {}", all.len(), kind, wallet)
            );
        }

        all
    }

    async fn fetch_page(&self, url: &str) -> Result<Vec<RawEnhancedTransaction>, String> {
        let response = self.client
            .get(url)
            .send().await
            .map_err(|e| format!("request error: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }

        response.json().await.map_err(|e| format!("decode error: {}", e))
    }
}

// ============================================================================
// RAW WIRE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnhancedTransaction {
    signature: Option<String>,
    timestamp: Option<i64>,
    native_transfers: Option<Vec<RawNativeTransfer>>,
    token_transfers: Option<Vec<RawTokenTransfer>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNativeTransfer {
    from_user_account: Option<String>,
    to_user_account: Option<String>,
    amount: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenTransfer {
    from_user_account: Option<String>,
    to_user_account: Option<String>,
    mint: Option<String>,
    token_amount: Option<f64>,
}

impl RawEnhancedTransaction {
    /// Validate into owned parts; records without a signature are dropped
    fn into_parts(self) -> Option<(String, i64, Vec<NativeTransfer>, Vec<TokenTransfer>)> {
        let signature = self.signature?;
        let timestamp = self.timestamp.unwrap_or(0);

        let native = self.native_transfers
            .unwrap_or_default()
            .into_iter()
            .map(|nt| NativeTransfer {
                from_user_account: nt.from_user_account.unwrap_or_default(),
                to_user_account: nt.to_user_account.unwrap_or_default(),
                amount: nt.amount.unwrap_or(0),
            })
            .collect();

        let tokens = self.token_transfers
            .unwrap_or_default()
            .into_iter()
            .map(|tt| TokenTransfer {
                from_user_account: tt.from_user_account.unwrap_or_default(),
                to_user_account: tt.to_user_account.unwrap_or_default(),
                mint: tt.mint.unwrap_or_default(),
                token_amount: tt.token_amount.unwrap_or(0.0),
            })
            .collect();

        Some((signature, timestamp, native, tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_enhanced_transaction_shape() {
        let raw: RawEnhancedTransaction = serde_json
            ::from_str(
                r#"{
                "signature": "sig1",
                "timestamp": 1770000000,
                "nativeTransfers": [
                    { "fromUserAccount": "walletA", "toUserAccount": "pool", "amount": 10000000000 }
                ],
                "tokenTransfers": [
                    { "fromUserAccount": "pool", "toUserAccount": "walletA", "mint": "MintM", "tokenAmount": 1000000.0 }
                ]
            }"#
            )
            .unwrap();

        let (signature, timestamp, native, tokens) = raw.into_parts().unwrap();
        assert_eq!(signature, "sig1");
        assert_eq!(timestamp, 1770000000);
        assert_eq!(native[0].amount, 10_000_000_000);
        assert_eq!(tokens[0].mint, "MintM");
        assert_eq!(tokens[0].token_amount, 1_000_000.0);
    }

    #[test]
    fn record_without_signature_is_dropped() {
        let raw: RawEnhancedTransaction = serde_json
            ::from_str(r#"{ "timestamp": 5 }"#)
            .unwrap();
        assert!(raw.into_parts().is_none());
    }

    #[test]
    fn missing_transfer_lists_become_empty() {
        let raw: RawEnhancedTransaction = serde_json
            ::from_str(r#"{ "signature": "sig2" }"#)
            .unwrap();
        let (_, timestamp, native, tokens) = raw.into_parts().unwrap();
        assert_eq!(timestamp, 0);
        assert!(native.is_empty());
        assert!(tokens.is_empty());
    }
}
