use anyhow::Context;
use solpnl::apis::dexscreener::DexScreenerClient;
use solpnl::apis::helius::HeliusClient;
use solpnl::dashboard::{
    load_comparison_wallet,
    load_wallet_pnl,
    load_wallet_view,
    log_comparison,
    log_history_tail,
    log_wallet_summary,
};
use solpnl::global::{ arg_value, load_configs };
use solpnl::logger::{ log, LogTag };
use solpnl::price_feed::PriceFeed;
use solpnl::rpc::RpcClient;
use solpnl::snapshot::compare;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configs = load_configs()
        .map_err(|e| anyhow::anyhow!("{}", e))
        .context("failed to load configuration")?;

    log(LogTag::System, "START", &format!("solpnl dashboard for {}", configs.wallet));
    if configs.helius_api_key.is_empty() {
        log(LogTag::System, "WARNING", "No Helius API key: PnL section will stay empty");
    }

    let rpc = RpcClient::new(&configs.rpc_url);
    let dex = Arc::new(DexScreenerClient::new());
    let helius = HeliusClient::new(&configs.helius_api_base, &configs.helius_api_key);

    // Price feed: interval poll + push subscription, torn down on exit
    let shutdown = Arc::new(Notify::new());
    let price_feed = Arc::new(PriceFeed::new());
    let feed_handle = price_feed.start(
        Arc::clone(&dex),
        configs.websocket_url.clone(),
        configs.price_poll_secs,
        Arc::clone(&shutdown)
    );

    // First quote before the initial render
    price_feed.refresh(&dex).await;

    let mut refresh = tokio::time::interval(Duration::from_secs(configs.holdings_refresh_secs.max(30)));
    let compare_wallet = arg_value("--compare");
    let mut first_pass = true;

    loop {
        tokio::select! {
            _ = refresh.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }

        let quote = price_feed.current().await;
        if quote.is_unset() {
            log(LogTag::System, "WARNING", "SOL price unavailable; USD figures degrade to zero");
        } else {
            let age_secs = (chrono::Utc::now() - quote.as_of).num_seconds();
            if age_secs > (configs.price_poll_secs as i64) * 2 {
                log(
                    LogTag::System,
                    "WARNING",
                    &format!("SOL price quote is {}s old; feed may be degraded", age_secs)
                );
            }
        }

        // The primary wallet failing must not take the comparison down
        match load_wallet_view(&rpc, &dex, &configs.wallet, quote.price_usd).await {
            Ok(view) => {
                let pnl = load_wallet_pnl(
                    &helius,
                    &view.tokens,
                    &configs.wallet,
                    configs.swap_page_cap,
                    configs.transfer_page_cap
                ).await;
                log_wallet_summary(&view, &pnl, &quote);
                log_history_tail(&view, &pnl, configs.history_start_ts);

                if first_pass {
                    if let Some(guest) = &compare_wallet {
                        if
                            let Some((guest_view, guest_pnl)) = load_comparison_wallet(
                                &rpc,
                                &dex,
                                &helius,
                                &configs,
                                guest,
                                quote.price_usd
                            ).await
                        {
                            // PnL metrics join the comparison only when both
                            // sides actually have cost-basis data
                            let primary_pnl = (pnl.summary.tokens_traded > 0).then(|| (
                                pnl.summary.net_realized_sol,
                                pnl.summary.tokens_traded,
                            ));
                            let guest_pnl_metrics = (guest_pnl.summary.tokens_traded > 0).then(|| (
                                guest_pnl.summary.net_realized_sol,
                                guest_pnl.summary.tokens_traded,
                            ));
                            let result = compare(
                                &view.snapshot,
                                &guest_view.snapshot,
                                primary_pnl,
                                guest_pnl_metrics
                            );
                            log_comparison(&configs.wallet, guest, &result);
                        }
                    }
                }
            }
            Err(e) => {
                log(LogTag::System, "ERROR", &format!("Wallet load failed: {}", e));
            }
        }

        if first_pass {
            first_pass = false;
            log(
                LogTag::System,
                "INFO",
                &format!("Refreshing every {}s, Ctrl-C to stop", configs.holdings_refresh_secs)
            );
        }
    }

    log(LogTag::System, "SHUTDOWN", "Stopping background services");
    shutdown.notify_waiters();
    let _ = feed_handle.await;
    Ok(())
}
