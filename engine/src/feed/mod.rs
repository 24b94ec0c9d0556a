// Live market data feed: subscription, sample type and transport seam
pub mod binance;
pub mod message;

pub use binance::{BinanceKlineStream, BinanceRest};
pub use message::parse_kline_message;

use crate::services::events::SessionEvent;
use shared::models::{Candle, TimeFrame};
use shared::utils::millis_to_secs;
use std::future::Future;
use tokio::sync::{mpsc, oneshot};

/// Normal websocket closure code; a close with this code never reconnects.
pub const NORMAL_CLOSURE: u16 = 1000;

/// The symbol/timeframe pair a live stream is subscribed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub symbol: String,
    pub timeframe: TimeFrame,
}

impl Subscription {
    pub fn new(symbol: impl Into<String>, timeframe: TimeFrame) -> Self {
        Self { symbol: symbol.into(), timeframe }
    }

    /// Stream name in the exchange's `<symbol>@kline_<interval>` form.
    pub fn stream_name(&self) -> String {
        format!("{}@kline_{}", self.symbol.to_lowercase(), self.timeframe)
    }

    pub fn matches(&self, sample: &LiveSample) -> bool {
        sample.symbol.eq_ignore_ascii_case(&self.symbol) && sample.timeframe == self.timeframe
    }
}

/// A structurally valid kline update from the live feed.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSample {
    pub symbol: String,
    pub timeframe: TimeFrame,
    /// Bucket open time in milliseconds, as sent by the exchange.
    pub open_time_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// True once the exchange has closed this bucket.
    pub is_closed: bool,
}

impl LiveSample {
    pub fn to_candle(&self) -> Candle {
        Candle {
            time: millis_to_secs(self.open_time_ms),
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// A live stream connection. `run` drives one connection attempt to
/// completion, reporting `Transport` and `TickReceived` events tagged with
/// `attempt`, and closes with the normal closure code once `shutdown` fires.
pub trait LiveTransport: Send + Sync + 'static {
    fn run(
        &self,
        subscription: Subscription,
        attempt: u64,
        events: mpsc::UnboundedSender<SessionEvent>,
        shutdown: oneshot::Receiver<()>,
    ) -> impl Future<Output = ()> + Send;
}
