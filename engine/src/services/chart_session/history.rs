// Initial load and backward paging for a chart session
use super::{BackfillState, ChartSession};
use crate::data::FetchRequest;
use crate::error::Result;
use crate::services::events::SessionCommand;
use crate::services::render::RenderSink;
use shared::models::Candle;

impl ChartSession {
    fn page_request(&self, end_time_exclusive: Option<i64>) -> FetchRequest {
        FetchRequest {
            symbol: self.symbol.clone(),
            timeframe: self.timeframe,
            limit: self.page_limit,
            end_time_exclusive,
        }
    }

    pub(super) fn begin_load(&mut self) -> Vec<SessionCommand> {
        self.backfill = BackfillState { loading: true, has_more: true, ..BackfillState::default() };
        vec![SessionCommand::FetchHistory { generation: self.generation, request: self.page_request(None) }]
    }

    pub(super) fn on_history_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<Candle>>,
        sink: &mut dyn RenderSink,
    ) -> Vec<SessionCommand> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "Discarding stale history load");
            return Vec::new();
        }
        self.backfill.loading = false;
        self.backfill.history_loaded = true;
        match result {
            Ok(candles) if !candles.is_empty() => {
                tracing::info!(symbol = %self.symbol, timeframe = %self.timeframe, candles = candles.len(), "History loaded");
                self.series.replace_all(candles);
                self.backfill.has_more = true;
            }
            Ok(_) => {
                tracing::info!(symbol = %self.symbol, timeframe = %self.timeframe, "No history available");
                self.series.clear();
                self.backfill.has_more = false;
            }
            Err(e) => {
                tracing::error!(symbol = %self.symbol, timeframe = %self.timeframe, error = %e, "Initial history load failed");
                self.series.clear();
                self.backfill.has_more = false;
                sink.report_error(&e);
            }
        }
        sink.draw_series(&self.series);
        self.recompute(sink);
        Vec::new()
    }

    /// Asks for the page just before the earliest loaded candle. At most one
    /// page is outstanding at a time.
    pub(super) fn request_older_page(&mut self) -> Vec<SessionCommand> {
        let state = self.backfill;
        if !state.history_loaded || state.loading || state.in_flight || !state.has_more {
            tracing::trace!(?state, "Backfill not requested");
            return Vec::new();
        }
        let Some(earliest) = self.series.earliest_time() else {
            return Vec::new();
        };
        self.backfill.in_flight = true;
        tracing::debug!(generation = self.generation, before = earliest, "Requesting older page");
        vec![SessionCommand::FetchPage { generation: self.generation, request: self.page_request(Some(earliest)) }]
    }

    pub(super) fn on_page_fetched(
        &mut self,
        generation: u64,
        result: Result<Vec<Candle>>,
        sink: &mut dyn RenderSink,
    ) -> Vec<SessionCommand> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "Discarding stale page");
            return Vec::new();
        }
        self.backfill.in_flight = false;
        let mut page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(symbol = %self.symbol, error = %e, "Backfill page fetch failed");
                sink.report_error(&e);
                return Vec::new();
            }
        };

        // Sources that treat the end bound inclusively resend the boundary candle.
        if let Some(earliest) = self.series.earliest_time() {
            let fetched = page.len();
            page.retain(|c| c.time < earliest);
            if page.len() != fetched {
                tracing::warn!(dropped = fetched - page.len(), earliest, "Dropped page candles at or after the series start");
            }
        }
        if page.is_empty() {
            tracing::info!(symbol = %self.symbol, timeframe = %self.timeframe, "Reached the start of available history");
            self.backfill.has_more = false;
            return Vec::new();
        }

        let added = self.series.prepend_page(page);
        tracing::debug!(added, candles = self.series.len(), "Prepended older page");
        sink.draw_series(&self.series);
        self.recompute(sink);
        Vec::new()
    }
}
