pub mod candle_series;
pub mod csv_parser;
pub mod source;

pub use candle_series::{CandleSeries, TailUpdate};
pub use source::{CsvHistory, FetchRequest, HistoricalSource, HistoryBackend};
