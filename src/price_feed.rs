/// Live SOL price feed.
///
/// A background task polls DexScreener on an interval and, when a WebSocket
/// endpoint is configured, additionally subscribes to the wrapped-SOL
/// account so pushes trigger an immediate refresh. The only shared state is
/// the current `PriceQuote`, read atomically by aggregation calls and
/// judged for staleness by the caller via `as_of`.
use crate::apis::dexscreener::DexScreenerClient;
use crate::global::{ is_debug_price_feed_enabled, SOL_MINT };
use crate::logger::{ log, LogTag };
use crate::types::PriceQuote;
use chrono::Utc;
use futures_util::{ SinkExt, StreamExt };
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{ Notify, RwLock };
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Delay before reconnecting a dropped push subscription
const RECONNECT_DELAY_SECS: u64 = 5;

pub struct PriceFeed {
    quote: Arc<RwLock<PriceQuote>>,
}

impl PriceFeed {
    pub fn new() -> Self {
        Self {
            quote: Arc::new(RwLock::new(PriceQuote::empty())),
        }
    }

    /// Current quote; `as_of` tells the caller how fresh it is
    pub async fn current(&self) -> PriceQuote {
        *self.quote.read().await
    }

    /// Poll once and store the result. Returns the fresh price when the
    /// poll succeeded.
    pub async fn refresh(&self, dex: &DexScreenerClient) -> Option<f64> {
        let price = dex.sol_price_usd().await?;
        let mut quote = self.quote.write().await;
        *quote = PriceQuote { price_usd: price, as_of: Utc::now() };

        if is_debug_price_feed_enabled() {
            log(LogTag::PriceFeed, "DEBUG", &format!("SOL price refreshed: ${:.2}", price));
        }
        Some(price)
    }

    /// Start the background feed: interval poll plus optional push nudges.
    /// Stops when `shutdown` is notified, severing the subscription.
    pub fn start(
        self: &Arc<Self>,
        dex: Arc<DexScreenerClient>,
        websocket_url: String,
        poll_secs: u64,
        shutdown: Arc<Notify>
    ) -> tokio::task::JoinHandle<()> {
        let feed = Arc::clone(self);
        let nudge = Arc::new(Notify::new());

        if !websocket_url.is_empty() {
            tokio::spawn(
                run_push_subscription(websocket_url, Arc::clone(&nudge), Arc::clone(&shutdown))
            );
        }

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(poll_secs.max(1)));
            loop {
                tokio::select! {
                    _ = shutdown.notified() => {
                        log(LogTag::PriceFeed, "SHUTDOWN", "Price feed stopping");
                        break;
                    }
                    _ = interval.tick() => {
                        feed.refresh(&dex).await;
                    }
                    _ = nudge.notified() => {
                        feed.refresh(&dex).await;
                    }
                }
            }
        })
    }
}

impl Default for PriceFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscribe to the wrapped-SOL account over the RPC WebSocket and notify
/// the poll loop on every push. Reconnects after a delay when the socket
/// drops; exits on shutdown.
async fn run_push_subscription(url: String, nudge: Arc<Notify>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                return;
            }
            result = connect_async(url.as_str()) => {
                match result {
                    Ok((mut stream, _)) => {
                        let subscribe = serde_json::json!({
                            "jsonrpc": "2.0",
                            "id": 1,
                            "method": "accountSubscribe",
                            "params": [SOL_MINT, { "encoding": "base64", "commitment": "confirmed" }]
                        });
                        if let Err(e) = stream.send(Message::Text(subscribe.to_string())).await {
                            log(
                                LogTag::PriceFeed,
                                "WARNING",
                                &format!("Push subscribe failed: {}", e)
                            );
                        } else {
                            log(LogTag::PriceFeed, "SUCCESS", "Push subscription live");
                            loop {
                                tokio::select! {
                                    _ = shutdown.notified() => {
                                        let _ = stream.close(None).await;
                                        return;
                                    }
                                    message = stream.next() => {
                                        match message {
                                            Some(Ok(Message::Ping(payload))) => {
                                                let _ = stream.send(Message::Pong(payload)).await;
                                            }
                                            Some(Ok(_)) => {
                                                nudge.notify_one();
                                            }
                                            Some(Err(_)) | None => {
                                                break;
                                            }
                                        }
                                    }
                                }
                            }
                            log(LogTag::PriceFeed, "WARNING", "Push subscription dropped, reconnecting");
                        }
                    }
                    Err(e) => {
                        if is_debug_price_feed_enabled() {
                            log(
                                LogTag::PriceFeed,
                                "DEBUG",
                                &format!("Push connect failed: {}", e)
                            );
                        }
                    }
                }
            }
        }

        tokio::select! {
            _ = shutdown.notified() => {
                return;
            }
            _ = tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECS)) => {}
        }
    }
}
