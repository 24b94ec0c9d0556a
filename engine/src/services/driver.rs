// Async driver: feeds session events one at a time and runs the resulting I/O
use crate::data::source::HistoricalSource;
use crate::error::{EngineError, Result};
use crate::feed::LiveTransport;
use crate::services::chart_session::ChartSession;
use crate::services::events::{SessionCommand, SessionEvent, TransportEvent};
use crate::services::render::RenderSink;
use shared::models::{IndicatorSettings, TimeFrame};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;
use tracing::Instrument;

/// Caller-side handle to a running session. Cloneable; every call enqueues
/// one event and fails only once the driver has stopped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    fn send(&self, event: SessionEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| EngineError::SessionClosed)
    }

    pub fn reset(&self) -> Result<()> {
        self.send(SessionEvent::Reset)
    }

    pub fn change_selection(&self, symbol: impl Into<String>, timeframe: TimeFrame) -> Result<()> {
        self.send(SessionEvent::SelectionChanged { symbol: symbol.into(), timeframe })
    }

    pub fn apply_settings(&self, settings: IndicatorSettings) -> Result<()> {
        self.send(SessionEvent::SettingsChanged(settings))
    }

    pub fn enable_streaming(&self) -> Result<()> {
        self.send(SessionEvent::StreamingToggled { enabled: true })
    }

    pub fn disable_streaming(&self) -> Result<()> {
        self.send(SessionEvent::StreamingToggled { enabled: false })
    }

    /// Signals that the viewport is close to the earliest loaded candle.
    pub fn request_older_page(&self) -> Result<()> {
        self.send(SessionEvent::ViewportNearedEdge)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(SessionEvent::Shutdown)
    }
}

pub struct SessionDriver<H, T, S> {
    session: ChartSession,
    history: Arc<H>,
    transport: Arc<T>,
    sink: S,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events: UnboundedReceiverStream<SessionEvent>,
    // Shutdown triggers for transports that may still be running, by attempt.
    transports: HashMap<u64, oneshot::Sender<()>>,
}

impl<H, T, S> SessionDriver<H, T, S>
where
    H: HistoricalSource,
    T: LiveTransport,
    S: RenderSink,
{
    pub fn new(session: ChartSession, history: H, transport: T, sink: S) -> (Self, SessionHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = SessionHandle { tx: events_tx.clone() };
        let driver = SessionDriver {
            session,
            history: Arc::new(history),
            transport: Arc::new(transport),
            sink,
            events_tx,
            events: UnboundedReceiverStream::new(events_rx),
            transports: HashMap::new(),
        };
        (driver, handle)
    }

    /// Runs until a shutdown event is handled, then returns the sink.
    pub async fn run(mut self) -> S {
        let span = tracing::info_span!(
            "chart_session",
            session_id = %self.session.id(),
            symbol = %self.session.symbol(),
            timeframe = %self.session.timeframe()
        );
        async move {
            let commands = self.session.start();
            self.execute(commands);

            while let Some(event) = self.events.next().await {
                let stop = matches!(event, SessionEvent::Shutdown);
                if let SessionEvent::Transport { attempt, event: TransportEvent::Closed { .. } | TransportEvent::Failed(_) } = &event {
                    self.transports.remove(attempt);
                }
                let commands = self.session.handle(event, &mut self.sink);
                self.execute(commands);
                if stop {
                    break;
                }
            }

            for (_, stop) in self.transports.drain() {
                let _ = stop.send(());
            }
            tracing::info!("Chart session stopped");
            self.sink
        }
        .instrument(span)
        .await
    }

    fn execute(&mut self, commands: Vec<SessionCommand>) {
        for command in commands {
            match command {
                SessionCommand::FetchHistory { generation, request } => {
                    let history = Arc::clone(&self.history);
                    let tx = self.events_tx.clone();
                    tokio::spawn(
                        async move {
                            let result = history.fetch_candles(request).await;
                            let _ = tx.send(SessionEvent::HistoryLoaded { generation, result });
                        }
                        .in_current_span(),
                    );
                }
                SessionCommand::FetchPage { generation, request } => {
                    let history = Arc::clone(&self.history);
                    let tx = self.events_tx.clone();
                    tokio::spawn(
                        async move {
                            let result = history.fetch_candles(request).await;
                            let _ = tx.send(SessionEvent::PageFetched { generation, result });
                        }
                        .in_current_span(),
                    );
                }
                SessionCommand::OpenTransport { attempt, subscription } => {
                    let (stop_tx, stop_rx) = oneshot::channel();
                    self.transports.insert(attempt, stop_tx);
                    let transport = Arc::clone(&self.transport);
                    let tx = self.events_tx.clone();
                    tokio::spawn(
                        async move {
                            transport.run(subscription, attempt, tx, stop_rx).await;
                        }
                        .in_current_span(),
                    );
                }
                SessionCommand::CloseTransport { attempt } => {
                    if let Some(stop) = self.transports.remove(&attempt) {
                        let _ = stop.send(());
                    }
                }
                SessionCommand::ScheduleReconnect { attempt, delay } => {
                    let tx = self.events_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(SessionEvent::ReconnectDue { attempt });
                    });
                }
            }
        }
    }
}
