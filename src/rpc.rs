/// Solana JSON-RPC adapter.
///
/// Plain JSON-RPC over reqwest: the dashboard is read-only, so the two
/// methods it needs (getBalance, getTokenAccountsByOwner) are issued
/// directly with jsonParsed encoding instead of pulling in a full chain SDK.
use crate::errors::DashboardError;
use crate::global::{
    is_debug_rpc_enabled,
    LAMPORTS_PER_SOL,
    TOKEN_2022_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
};
use crate::logger::{ log, LogTag };
use crate::types::TokenAccount;
use std::time::Duration;

const RPC_TIMEOUT_SECS: u64 = 30;

/// Converts lamports to SOL amount
pub fn lamports_to_sol(lamports: u64) -> f64 {
    (lamports as f64) / (LAMPORTS_PER_SOL as f64)
}

/// Converts SOL amount to lamports (1 SOL = 1,000,000,000 lamports)
pub fn sol_to_lamports(sol_amount: f64) -> u64 {
    (sol_amount * (LAMPORTS_PER_SOL as f64)) as u64
}

/// Sanity-check a wallet address: base58, 32 bytes decoded
pub fn validate_wallet_address(address: &str) -> Result<(), DashboardError> {
    let decoded = bs58
        ::decode(address)
        .into_vec()
        .map_err(|_| DashboardError::InvalidWallet(address.to_string()))?;
    if decoded.len() != 32 {
        return Err(DashboardError::InvalidWallet(address.to_string()));
    }
    Ok(())
}

pub struct RpcClient {
    client: reqwest::Client,
    rpc_url: String,
}

impl RpcClient {
    pub fn new(rpc_url: &str) -> Self {
        Self {
            client: reqwest::Client
                ::builder()
                .timeout(Duration::from_secs(RPC_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            rpc_url: rpc_url.to_string(),
        }
    }

    /// Issue one JSON-RPC call and return the `result` field
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value
    ) -> Result<serde_json::Value, DashboardError> {
        let payload =
            serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self.client
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send().await?;

        let body: serde_json::Value = response.json().await?;

        if let Some(error) = body.get("error") {
            return Err(DashboardError::Rpc(format!("{} failed: {}", method, error)));
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| DashboardError::Rpc(format!("{} returned no result", method)))
    }

    /// Get SOL balance for a wallet address.
    ///
    /// This is the one wallet-level call whose failure propagates: a
    /// dashboard section cannot render without it.
    pub async fn get_sol_balance(&self, wallet: &str) -> Result<f64, DashboardError> {
        let result = self.call("getBalance", serde_json::json!([wallet])).await?;

        let lamports = result
            .get("value")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| DashboardError::Parse("getBalance value missing".to_string()))?;

        let balance_sol = lamports_to_sol(lamports);

        if is_debug_rpc_enabled() {
            log(
                LogTag::Rpc,
                "DEBUG",
                &format!("SOL balance: {} lamports ({:.6} SOL)", lamports, balance_sol)
            );
        }

        Ok(balance_sol)
    }

    /// Fetch all non-zero token accounts for a wallet, across both the SPL
    /// Token and Token-2022 program namespaces.
    ///
    /// The holdings list is the union of the namespaces; the Token-2022
    /// query failing independently only loses that slice. Total failure
    /// returns an empty list, never an error.
    pub async fn get_token_accounts(&self, wallet: &str) -> Vec<TokenAccount> {
        let mut accounts = match self.token_accounts_for_program(wallet, TOKEN_PROGRAM_ID).await {
            Ok(list) => list,
            Err(e) => {
                log(LogTag::Rpc, "WARNING", &format!("Token account fetch failed: {}", e));
                Vec::new()
            }
        };

        match self.token_accounts_for_program(wallet, TOKEN_2022_PROGRAM_ID).await {
            Ok(list) => accounts.extend(list),
            Err(e) => {
                if is_debug_rpc_enabled() {
                    log(LogTag::Rpc, "DEBUG", &format!("Token-2022 query failed: {}", e));
                }
            }
        }

        if is_debug_rpc_enabled() {
            log(
                LogTag::Rpc,
                "DEBUG",
                &format!("Found {} token accounts with non-zero balance", accounts.len())
            );
        }

        accounts
    }

    async fn token_accounts_for_program(
        &self,
        wallet: &str,
        program_id: &str
    ) -> Result<Vec<TokenAccount>, DashboardError> {
        let result = self.call(
            "getTokenAccountsByOwner",
            serde_json::json!([
                wallet,
                { "programId": program_id },
                { "encoding": "jsonParsed" }
            ])
        ).await?;

        let value = result
            .get("value")
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                DashboardError::Parse("getTokenAccountsByOwner value missing".to_string())
            })?;

        let mut accounts = Vec::new();
        for keyed_account in value {
            if let Some(account) = parse_token_account(keyed_account) {
                if account.balance > 0.0 {
                    accounts.push(account);
                }
            }
        }

        Ok(accounts)
    }
}

/// Parse one jsonParsed keyed account into a TokenAccount.
/// Malformed entries are skipped, not fatal.
fn parse_token_account(keyed_account: &serde_json::Value) -> Option<TokenAccount> {
    let info = keyed_account.get("account")?.get("data")?.get("parsed")?.get("info")?;
    let mint = info.get("mint")?.as_str()?.to_string();
    let token_amount = info.get("tokenAmount")?;
    let decimals = token_amount.get("decimals")?.as_u64()? as u8;
    let balance = token_amount
        .get("uiAmountString")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<f64>().ok())
        .or_else(|| token_amount.get("uiAmount").and_then(|v| v.as_f64()))
        .unwrap_or(0.0);

    Some(TokenAccount { mint, balance, decimals })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lamports_round_trip() {
        assert_eq!(lamports_to_sol(1_000_000_000), 1.0);
        assert_eq!(sol_to_lamports(0.5), 500_000_000);
    }

    #[test]
    fn validates_wallet_addresses() {
        assert!(validate_wallet_address("H1qpELxeLZoAuMKDQ88ApyUbyxvDKnh9YGpaA715NjaF").is_ok());
        assert!(validate_wallet_address("not-base58!").is_err());
        assert!(validate_wallet_address("abc").is_err());
    }

    #[test]
    fn parses_json_parsed_token_account() {
        let raw =
            serde_json::json!({
            "pubkey": "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
            "account": {
                "data": {
                    "parsed": {
                        "info": {
                            "mint": "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263",
                            "tokenAmount": {
                                "amount": "1500000",
                                "decimals": 5,
                                "uiAmount": 15.0,
                                "uiAmountString": "15"
                            }
                        }
                    }
                }
            }
        });

        let account = parse_token_account(&raw).unwrap();
        assert_eq!(account.mint, "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263");
        assert_eq!(account.balance, 15.0);
        assert_eq!(account.decimals, 5);
    }

    #[test]
    fn malformed_account_is_skipped() {
        let raw = serde_json::json!({ "account": { "data": "base64stuff" } });
        assert!(parse_token_account(&raw).is_none());
    }
}
