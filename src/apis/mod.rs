/// External API clients.
///
/// Both clients recover from transport failures locally: a network error, a
/// non-2xx status or malformed JSON yields an empty result set plus a log
/// line, never an error crossing into the engines.
pub mod dexscreener;
pub mod helius;
