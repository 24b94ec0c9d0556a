// Session inputs and the side effects the session asks its driver to perform
use crate::data::source::FetchRequest;
use crate::error::Result;
use crate::feed::{LiveSample, Subscription};
use shared::models::{Candle, IndicatorSettings, TimeFrame};
use std::time::Duration;

/// Everything that can change a chart session, in the order it is handled.
#[derive(Debug)]
pub enum SessionEvent {
    HistoryLoaded { generation: u64, result: Result<Vec<Candle>> },
    PageFetched { generation: u64, result: Result<Vec<Candle>> },
    TickReceived { attempt: u64, sample: LiveSample },
    Transport { attempt: u64, event: TransportEvent },
    ReconnectDue { attempt: u64 },
    SettingsChanged(IndicatorSettings),
    ViewportNearedEdge,
    StreamingToggled { enabled: bool },
    Reset,
    SelectionChanged { symbol: String, timeframe: TimeFrame },
    Shutdown,
}

/// Lifecycle of one live transport attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    /// `code` is the websocket close code when the peer sent one.
    Closed { code: Option<u16> },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    FetchHistory { generation: u64, request: FetchRequest },
    FetchPage { generation: u64, request: FetchRequest },
    OpenTransport { attempt: u64, subscription: Subscription },
    CloseTransport { attempt: u64 },
    ScheduleReconnect { attempt: u64, delay: Duration },
}
