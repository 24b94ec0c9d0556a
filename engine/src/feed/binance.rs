// Binance spot adapters: REST klines for history, kline websocket for live ticks
use super::{parse_kline_message, LiveTransport, Subscription, NORMAL_CLOSURE};
use crate::data::source::{FetchRequest, HistoricalSource};
use crate::error::{EngineError, Result};
use crate::services::events::{SessionEvent, TransportEvent};
use futures_util::{SinkExt, StreamExt};
use shared::models::Candle;
use shared::utils::{millis_to_secs, secs_to_millis};
use std::future::Future;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// One row of `/api/v3/klines`: open time, OHLCV as strings, close time,
/// quote volume, trade count, taker volumes and an unused field.
type RawKline = (i64, String, String, String, String, String, i64, String, i64, String, String, String);

pub struct BinanceRest {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceRest {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }

    /// The REST `endTime` is inclusive, so the exclusive bound is moved back
    /// by one millisecond to keep the boundary candle out of the page.
    pub fn klines_url(&self, request: &FetchRequest) -> String {
        let mut url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url.trim_end_matches('/'),
            request.symbol.to_uppercase(),
            request.timeframe,
            request.limit
        );
        if let Some(end) = request.end_time_exclusive {
            url.push_str(&format!("&endTime={}", secs_to_millis(end) - 1));
        }
        url
    }
}

fn parse_price(raw: &str, field: &str, open_time: i64) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|e| EngineError::FetchError(format!("Invalid {} '{}' in kline {}: {}", field, raw, open_time, e)))
}

fn parse_klines(rows: Vec<RawKline>) -> Result<Vec<Candle>> {
    rows.into_iter()
        .map(|(open_time, open, high, low, close, volume, ..)| {
            Ok(Candle {
                time: millis_to_secs(open_time),
                open: parse_price(&open, "open", open_time)?,
                high: parse_price(&high, "high", open_time)?,
                low: parse_price(&low, "low", open_time)?,
                close: parse_price(&close, "close", open_time)?,
                volume: parse_price(&volume, "volume", open_time)?,
            })
        })
        .collect()
}

impl HistoricalSource for BinanceRest {
    fn fetch_candles(&self, request: FetchRequest) -> impl Future<Output = Result<Vec<Candle>>> + Send {
        let url = self.klines_url(&request);
        let client = self.client.clone();
        async move {
            tracing::debug!(%url, "Fetching klines");
            let response = client.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EngineError::FetchError(format!("GET {} returned {}: {}", url, status, body)));
            }
            let rows: Vec<RawKline> = response.json().await?;
            let candles = parse_klines(rows)?;
            tracing::debug!(symbol = %request.symbol, timeframe = %request.timeframe, candles = candles.len(), "Fetched klines");
            Ok(candles)
        }
    }
}

pub struct BinanceKlineStream {
    ws_base_url: String,
}

impl BinanceKlineStream {
    pub fn new(ws_base_url: impl Into<String>) -> Self {
        Self { ws_base_url: ws_base_url.into() }
    }

    pub fn stream_url(&self, subscription: &Subscription) -> String {
        format!("{}/{}", self.ws_base_url.trim_end_matches('/'), subscription.stream_name())
    }
}

impl LiveTransport for BinanceKlineStream {
    fn run(
        &self,
        subscription: Subscription,
        attempt: u64,
        events: mpsc::UnboundedSender<SessionEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> impl Future<Output = ()> + Send {
        let url = self.stream_url(&subscription);
        async move {
            let report = |event: TransportEvent| events.send(SessionEvent::Transport { attempt, event }).is_ok();

            tracing::info!(%url, attempt, "Connecting to kline stream");
            let connected = tokio::select! {
                res = connect_async(url.as_str()) => res,
                _ = &mut shutdown => {
                    tracing::debug!(attempt, "Stream shut down before connecting");
                    return;
                }
            };
            let ws_stream = match connected {
                Ok((stream, _)) => stream,
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Kline stream connection failed");
                    report(TransportEvent::Failed(e.to_string()));
                    return;
                }
            };
            if !report(TransportEvent::Opened) {
                return;
            }

            let (mut write, mut read) = ws_stream.split();
            loop {
                tokio::select! {
                    msg = read.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => match parse_kline_message(&text) {
                                Some(sample) => {
                                    if events.send(SessionEvent::TickReceived { attempt, sample }).is_err() {
                                        tracing::warn!("Session event receiver dropped");
                                        return;
                                    }
                                }
                                None => tracing::debug!(attempt, "Dropped malformed kline message"),
                            },
                            Some(Ok(Message::Ping(payload))) => {
                                let _ = write.send(Message::Pong(payload)).await;
                            }
                            Some(Ok(Message::Close(frame))) => {
                                let code = frame.map(|f| u16::from(f.code));
                                tracing::info!(attempt, ?code, "Kline stream closed by server");
                                report(TransportEvent::Closed { code });
                                return;
                            }
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                tracing::warn!(attempt, error = %e, "Kline stream error");
                                report(TransportEvent::Failed(e.to_string()));
                                return;
                            }
                            None => {
                                tracing::info!(attempt, "Kline stream ended");
                                report(TransportEvent::Closed { code: None });
                                return;
                            }
                        }
                    }
                    _ = &mut shutdown => {
                        let frame = CloseFrame {
                            code: CloseCode::Normal,
                            reason: "User disabled real-time streaming".into(),
                        };
                        if let Err(e) = write.send(Message::Close(Some(frame))).await {
                            tracing::debug!(attempt, error = %e, "Close frame not delivered");
                        }
                        tracing::info!(attempt, "Kline stream closed");
                        report(TransportEvent::Closed { code: Some(NORMAL_CLOSURE) });
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::TimeFrame;

    fn request(end: Option<i64>) -> FetchRequest {
        FetchRequest { symbol: "btcusdt".to_string(), timeframe: TimeFrame::Hour1, limit: 500, end_time_exclusive: end }
    }

    #[test]
    fn test_klines_url_without_end_time() {
        let rest = BinanceRest::new("https://api.binance.com/");
        assert_eq!(
            rest.klines_url(&request(None)),
            "https://api.binance.com/api/v3/klines?symbol=BTCUSDT&interval=1h&limit=500"
        );
    }

    #[test]
    fn test_klines_url_end_time_is_exclusive() {
        let rest = BinanceRest::new("https://api.binance.com");
        let url = rest.klines_url(&request(Some(1_700_000_000)));
        assert!(url.ends_with("&endTime=1699999999999"), "{}", url);
    }

    #[test]
    fn test_parse_klines_rows() {
        let json = r#"[
            [1700000000000, "37000.1", "37100.0", "36900.5", "37050.0", "12.5", 1700003599999, "460000.0", 321, "6.0", "222000.0", "0"],
            [1700003600000, "37050.0", "37200.0", "37000.0", "37150.0", "8.25", 1700007199999, "306000.0", 210, "4.0", "148000.0", "0"]
        ]"#;
        let rows: Vec<RawKline> = serde_json::from_str(json).unwrap();
        let candles = parse_klines(rows).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].time, 1_700_000_000);
        assert_eq!(candles[0].open, 37000.1);
        assert_eq!(candles[0].low, 36900.5);
        assert_eq!(candles[1].time, 1_700_003_600);
        assert_eq!(candles[1].volume, 8.25);
    }

    #[test]
    fn test_parse_klines_rejects_bad_price() {
        let json = r#"[[1700000000000, "x", "1", "1", "1", "1", 1700003599999, "1", 1, "1", "1", "0"]]"#;
        let rows: Vec<RawKline> = serde_json::from_str(json).unwrap();
        let err = parse_klines(rows).unwrap_err();
        assert!(err.to_string().contains("Invalid open 'x'"));
    }

    #[test]
    fn test_stream_url() {
        let stream = BinanceKlineStream::new("wss://stream.binance.com:9443/ws/");
        let sub = Subscription::new("ETHUSDT", TimeFrame::Minute5);
        assert_eq!(stream.stream_url(&sub), "wss://stream.binance.com:9443/ws/ethusdt@kline_5m");
    }
}
