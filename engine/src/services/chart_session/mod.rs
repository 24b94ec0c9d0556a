// engine/src/services/chart_session/mod.rs
// Owns the chart state for one symbol/timeframe selection and dispatches
// session events to the history and streaming handlers.

pub mod history;
pub mod streaming;

use crate::config::EngineSettings;
use crate::data::CandleSeries;
use crate::feed::Subscription;
use crate::services::events::{SessionCommand, SessionEvent};
use crate::services::indicator_engine::IndicatorEngine;
use crate::services::render::RenderSink;
use crate::services::stream_reconciler::StreamReconciler;
use chrono::{DateTime, Utc};
use shared::models::{ConnectionStatus, IndicatorResult, IndicatorSettings, TimeFrame};
use uuid::Uuid;

/// Progress of the initial load and of backward paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackfillState {
    pub history_loaded: bool,
    pub loading: bool,
    pub in_flight: bool,
    pub has_more: bool,
}

pub struct ChartSession {
    id: Uuid,
    symbol: String,
    timeframe: TimeFrame,
    page_limit: usize,
    series: CandleSeries,
    settings: IndicatorSettings,
    // Bumped on reset and selection change; fetch results from older
    // generations are discarded.
    generation: u64,
    backfill: BackfillState,
    reconciler: StreamReconciler,
    last_update: Option<DateTime<Utc>>,
    last_result: IndicatorResult,
}

impl ChartSession {
    pub fn new(settings: &EngineSettings) -> Self {
        ChartSession {
            id: Uuid::new_v4(),
            symbol: settings.symbol.clone(),
            timeframe: settings.timeframe,
            page_limit: settings.initial_candle_limit,
            series: CandleSeries::new(),
            settings: settings.indicators,
            generation: 0,
            backfill: BackfillState::default(),
            reconciler: StreamReconciler::new(
                Subscription::new(settings.symbol.clone(), settings.timeframe),
                settings.reconnect_delay(),
            ),
            last_update: None,
            last_result: IndicatorResult::default(),
        }
    }

    /// Commands for the initial historical load.
    pub fn start(&mut self) -> Vec<SessionCommand> {
        tracing::info!(session_id = %self.id, symbol = %self.symbol, timeframe = %self.timeframe, "Starting chart session");
        self.begin_load()
    }

    pub fn handle(&mut self, event: SessionEvent, sink: &mut dyn RenderSink) -> Vec<SessionCommand> {
        match event {
            SessionEvent::HistoryLoaded { generation, result } => self.on_history_loaded(generation, result, sink),
            SessionEvent::PageFetched { generation, result } => self.on_page_fetched(generation, result, sink),
            SessionEvent::ViewportNearedEdge => self.request_older_page(),
            SessionEvent::TickReceived { attempt, sample } => self.on_tick(attempt, &sample, sink),
            SessionEvent::Transport { attempt, event } => self.on_transport(attempt, event, sink),
            SessionEvent::ReconnectDue { attempt } => self.on_reconnect_due(attempt, sink),
            SessionEvent::StreamingToggled { enabled } => self.set_streaming(enabled, sink),
            SessionEvent::SettingsChanged(settings) => {
                tracing::debug!(?settings, "Indicator settings changed");
                self.settings = settings;
                self.recompute(sink);
                Vec::new()
            }
            SessionEvent::Reset => {
                tracing::info!(symbol = %self.symbol, timeframe = %self.timeframe, "Resetting chart");
                self.reload(sink)
            }
            SessionEvent::SelectionChanged { symbol, timeframe } => {
                tracing::info!(%symbol, %timeframe, "Selection changed");
                self.symbol = symbol;
                self.timeframe = timeframe;
                let mut commands = self.reload(sink);
                commands.extend(self.resubscribe(sink));
                commands
            }
            SessionEvent::Shutdown => {
                tracing::info!(session_id = %self.id, "Shutting down chart session");
                self.set_streaming(false, sink)
            }
        }
    }

    /// Drops the current history and loads it again under a new generation.
    fn reload(&mut self, sink: &mut dyn RenderSink) -> Vec<SessionCommand> {
        self.generation += 1;
        self.series.clear();
        sink.draw_series(&self.series);
        self.recompute(sink);
        self.begin_load()
    }

    fn recompute(&mut self, sink: &mut dyn RenderSink) {
        self.last_result = IndicatorEngine::compute(&self.series, &self.settings);
        self.last_update = Some(Utc::now());
        sink.draw_indicators(&self.last_result);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> TimeFrame {
        self.timeframe
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    pub fn settings(&self) -> &IndicatorSettings {
        &self.settings
    }

    pub fn backfill(&self) -> BackfillState {
        self.backfill
    }

    pub fn status(&self) -> ConnectionStatus {
        self.reconciler.status()
    }

    pub fn indicators(&self) -> &IndicatorResult {
        &self.last_result
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }
}
