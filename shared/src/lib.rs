pub mod models;
pub mod utils;

pub use models::{
    Candle, ConnectionStatus, HistogramPoint, HistogramTone, IndicatorResult, IndicatorSettings,
    LinePoint, MacdOutput, MacdSettings, MovingAverageSettings, RsiOutput, RsiSettings, TimeFrame,
};
