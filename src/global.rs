use once_cell::sync::Lazy;
use serde::{ Deserialize, Serialize };
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| { Mutex::new(env::args().collect()) });

/// Wrapped-SOL mint. Swaps often route SOL through its SPL representation,
/// so this mint is excluded from token legs and counted as native flow.
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

fn has_arg(flag: &str) -> bool {
    if let Ok(args) = CMD_ARGS.lock() {
        args.iter().any(|a| a == flag)
    } else {
        false
    }
}

/// Check if debug API mode is enabled via command line args
pub fn is_debug_api_enabled() -> bool {
    has_arg("--debug-api")
}

/// Check if debug RPC mode is enabled via command line args
pub fn is_debug_rpc_enabled() -> bool {
    has_arg("--debug-rpc")
}

/// Check if debug PnL mode is enabled via command line args
pub fn is_debug_pnl_enabled() -> bool {
    has_arg("--debug-pnl")
}

/// Check if debug price feed mode is enabled via command line args
pub fn is_debug_price_feed_enabled() -> bool {
    has_arg("--debug-price-feed")
}

/// Value of a `--flag value` pair from the command line, if present
pub fn arg_value(flag: &str) -> Option<String> {
    if let Ok(args) = CMD_ARGS.lock() {
        let pos = args.iter().position(|a| a == flag)?;
        args.get(pos + 1).cloned()
    } else {
        None
    }
}

fn default_rpc_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}

fn default_websocket_url() -> String {
    "wss://api.mainnet-beta.solana.com".to_string()
}

fn default_helius_api_base() -> String {
    "https://api-mainnet.helius-rpc.com/v0".to_string()
}

fn default_price_poll_secs() -> u64 {
    20
}

fn default_holdings_refresh_secs() -> u64 {
    300
}

fn default_swap_page_cap() -> usize {
    8
}

fn default_transfer_page_cap() -> usize {
    4
}

/// Epoch the time-series replay starts from (2026-02-06 04:00 UTC).
fn default_history_start_ts() -> i64 {
    1_770_350_400
}

/// Represents the runtime configuration loaded from configs.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configs {
    /// Wallet whose dashboard is rendered
    pub wallet: String,
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,
    #[serde(default = "default_helius_api_base")]
    pub helius_api_base: String,
    /// Empty key disables the transaction indexer (PnL section stays empty)
    #[serde(default)]
    pub helius_api_key: String,
    #[serde(default = "default_price_poll_secs")]
    pub price_poll_secs: u64,
    #[serde(default = "default_holdings_refresh_secs")]
    pub holdings_refresh_secs: u64,
    #[serde(default = "default_swap_page_cap")]
    pub swap_page_cap: usize,
    #[serde(default = "default_transfer_page_cap")]
    pub transfer_page_cap: usize,
    #[serde(default = "default_history_start_ts")]
    pub history_start_ts: i64,
}

/// Reads the configs.json file from the project root and returns a Configs object
pub fn read_configs<P: AsRef<Path>>(path: P) -> Result<Configs, Box<dyn std::error::Error>> {
    let data = fs::read_to_string(path)?;
    let configs: Configs = serde_json::from_str(&data)?;
    Ok(configs)
}

/// Load configuration: configs.json when present, environment otherwise.
///
/// Recognized variables: SOLPNL_WALLET, SOLANA_RPC_URL, SOLANA_WS_URL,
/// HELIUS_API_KEY. Missing wallet is a hard error since nothing can be
/// rendered without one.
pub fn load_configs() -> Result<Configs, Box<dyn std::error::Error>> {
    if Path::new("configs.json").exists() {
        let mut configs = read_configs("configs.json")?;
        if configs.helius_api_key.is_empty() {
            if let Ok(key) = env::var("HELIUS_API_KEY") {
                configs.helius_api_key = key;
            }
        }
        return Ok(configs);
    }

    let wallet = env
        ::var("SOLPNL_WALLET")
        .map_err(|_| "No configs.json and SOLPNL_WALLET is not set")?;

    Ok(Configs {
        wallet,
        rpc_url: env::var("SOLANA_RPC_URL").unwrap_or_else(|_| default_rpc_url()),
        websocket_url: env::var("SOLANA_WS_URL").unwrap_or_else(|_| default_websocket_url()),
        helius_api_base: default_helius_api_base(),
        helius_api_key: env::var("HELIUS_API_KEY").unwrap_or_default(),
        price_poll_secs: default_price_poll_secs(),
        holdings_refresh_secs: default_holdings_refresh_secs(),
        swap_page_cap: default_swap_page_cap(),
        transfer_page_cap: default_transfer_page_cap(),
        history_start_ts: default_history_start_ts(),
    })
}
