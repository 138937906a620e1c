use chrono::Utc;
use colored::*;
use std::io::{ self, Write };

/// Log categories, one per subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Rpc,
    Api,
    Indexer,
    Holdings,
    CostBasis,
    Pnl,
    Snapshot,
    PriceFeed,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Rpc => "RPC",
            LogTag::Api => "API",
            LogTag::Indexer => "INDEXER",
            LogTag::Holdings => "HOLDINGS",
            LogTag::CostBasis => "COSTBASIS",
            LogTag::Pnl => "PNL",
            LogTag::Snapshot => "SNAPSHOT",
            LogTag::PriceFeed => "PRICEFEED",
        }
    }

    fn colored(&self) -> ColoredString {
        match self {
            LogTag::System => self.as_str().bold(),
            LogTag::Rpc => self.as_str().bright_green().bold(),
            LogTag::Api => self.as_str().cyan().bold(),
            LogTag::Indexer => self.as_str().magenta().bold(),
            LogTag::Holdings => self.as_str().blue().bold(),
            LogTag::CostBasis => self.as_str().yellow().bold(),
            LogTag::Pnl => self.as_str().bright_yellow().bold(),
            LogTag::Snapshot => self.as_str().bright_blue().bold(),
            LogTag::PriceFeed => self.as_str().bright_cyan().bold(),
        }
    }
}

fn get_timestamp() -> String {
    Utc::now().format("%H:%M:%S").to_string()
}

/// Log a tagged status line to the console.
///
/// Status strings follow the usual convention: "ERROR", "WARNING", "DEBUG",
/// "SUCCESS" or a short free-form action tag ("FETCH", "CACHE_HIT", ...).
/// Debug gating happens at call sites via `global::is_debug_*_enabled`.
pub fn log(tag: LogTag, status: &str, message: &str) {
    let timestamp = format!("[{}]", get_timestamp()).dimmed();
    let status_colored = match status {
        "ERROR" => status.red().bold(),
        "WARNING" => status.yellow().bold(),
        "SUCCESS" => status.green().bold(),
        "DEBUG" => status.dimmed(),
        _ => status.normal(),
    };
    let body = match status {
        "ERROR" => message.red(),
        "WARNING" => message.yellow(),
        "DEBUG" => message.dimmed(),
        _ => message.normal(),
    };
    println!("{} {} [{}] {}", timestamp, tag.colored(), status_colored, body);
    let _ = io::stdout().flush();
}

/// Plain line without tag decoration, for multi-line summary blocks
pub fn log_plain(message: &str) {
    println!("{}", message);
    let _ = io::stdout().flush();
}
