// Technical indicators module
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::{ema, ema_line, Ema};
pub use macd::{macd, Macd};
pub use rsi::{rsi, Rsi};
pub use sma::{sma, Sma};

use serde_json::Value;
use shared::models::{Candle, LinePoint};

/// Common trait for all indicators.
///
/// Every indicator returns series whose timestamps are a subsequence of the
/// input candle times. Too little input yields empty output, never a padded
/// or partial one.
pub trait IndicatorCalculator: Send + Sync {
    type Output;

    fn name(&self) -> String;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn calculate(&self, data: &[Candle]) -> Self::Output;
}

/// Close prices as a line series, the input shape shared by EMA and MACD.
pub(crate) fn close_line(data: &[Candle]) -> Vec<LinePoint> {
    data.iter().map(|c| LinePoint { time: c.time, value: c.close }).collect()
}
