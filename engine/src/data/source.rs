// Historical candle sources consumed by the session driver
use crate::data::candle_series::CandleSeries;
use crate::data::csv_parser::CandleCsvParser;
use crate::error::Result;
use crate::feed::binance::BinanceRest;
use shared::models::{Candle, TimeFrame};
use std::future::Future;
use std::path::Path;

/// One page request: the `limit` most recent candles strictly before
/// `end_time_exclusive` (seconds), or the most recent overall when `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub limit: usize,
    pub end_time_exclusive: Option<i64>,
}

/// Returns candles ascending by time. An empty page means there is no more
/// history before the requested point.
pub trait HistoricalSource: Send + Sync + 'static {
    fn fetch_candles(&self, request: FetchRequest) -> impl Future<Output = Result<Vec<Candle>>> + Send;
}

/// Serves history from a CSV export loaded once at startup. Symbol and
/// timeframe in the request are not checked against the file.
pub struct CsvHistory {
    candles: CandleSeries,
}

impl CsvHistory {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let candles = CandleCsvParser::load_candles_from_csv(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), candles = candles.len(), "Loaded CSV history");
        Ok(Self::from_candles(candles))
    }

    pub fn from_candles(candles: Vec<Candle>) -> Self {
        Self { candles: CandleSeries::from_candles(candles) }
    }
}

impl HistoricalSource for CsvHistory {
    fn fetch_candles(&self, request: FetchRequest) -> impl Future<Output = Result<Vec<Candle>>> + Send {
        let page = self.candles.window_before(request.end_time_exclusive, request.limit);
        tracing::debug!(symbol = %request.symbol, end = ?request.end_time_exclusive, candles = page.len(), "Serving CSV page");
        async move { Ok(page) }
    }
}

/// The history source selected by configuration.
pub enum HistoryBackend {
    Binance(BinanceRest),
    Csv(CsvHistory),
}

impl HistoricalSource for HistoryBackend {
    fn fetch_candles(&self, request: FetchRequest) -> impl Future<Output = Result<Vec<Candle>>> + Send {
        async move {
            match self {
                HistoryBackend::Binance(rest) => rest.fetch_candles(request).await,
                HistoryBackend::Csv(csv) => csv.fetch_candles(request).await,
            }
        }
    }
}
