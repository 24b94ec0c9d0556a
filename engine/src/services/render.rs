// Presentation seam: what the session pushes to whoever draws the chart
use crate::data::CandleSeries;
use crate::error::EngineError;
use shared::models::{Candle, ConnectionStatus, IndicatorResult};
use shared::utils::format_secs;

pub trait RenderSink: Send {
    /// Wholesale redraw after an initial load, a reset or a prepended page.
    fn draw_series(&mut self, series: &CandleSeries);
    /// Incremental update of the newest candle from the live feed.
    fn update_tail(&mut self, candle: &Candle);
    fn draw_indicators(&mut self, result: &IndicatorResult);
    fn connection_status(&mut self, status: ConnectionStatus);
    fn report_error(&mut self, error: &EngineError);
}

/// Renders by logging. Used by the headless binary.
#[derive(Debug, Default)]
pub struct TracingSink;

impl RenderSink for TracingSink {
    fn draw_series(&mut self, series: &CandleSeries) {
        match (series.earliest_time(), series.latest_time()) {
            (Some(first), Some(last)) => tracing::info!(
                candles = series.len(),
                from = %format_secs(first),
                to = %format_secs(last),
                "Series redrawn"
            ),
            _ => tracing::info!("Series cleared"),
        }
    }

    fn update_tail(&mut self, candle: &Candle) {
        tracing::info!(
            time = %format_secs(candle.time),
            open = candle.open,
            high = candle.high,
            low = candle.low,
            close = candle.close,
            volume = candle.volume,
            "Tail updated"
        );
    }

    fn draw_indicators(&mut self, result: &IndicatorResult) {
        let last = |points: &Option<Vec<shared::models::LinePoint>>| points.as_ref().and_then(|p| p.last()).map(|p| p.value);
        tracing::debug!(
            sma = ?last(&result.sma),
            ema = ?last(&result.ema),
            rsi = ?result.rsi.as_ref().and_then(|r| r.values.last()).map(|p| p.value),
            macd = ?result.macd.as_ref().and_then(|m| m.histogram.last()).map(|h| (h.value, h.tone.class())),
            "Indicators redrawn"
        );
    }

    fn connection_status(&mut self, status: ConnectionStatus) {
        tracing::info!(%status, "Connection status changed");
    }

    fn report_error(&mut self, error: &EngineError) {
        tracing::error!(%error, "Chart error");
    }
}
