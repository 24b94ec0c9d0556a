// Exponential Moving Average (EMA) indicator implementation
use super::{close_line, IndicatorCalculator};
use serde_json::Value;
use shared::models::{Candle, LinePoint};

/// EMA of the close prices.
pub fn ema(data: &[Candle], period: usize) -> Vec<LinePoint> {
    ema_line(&close_line(data), period)
}

/// EMA over an arbitrary line series (MACD reuses this for its signal line).
///
/// Seeded with the mean of the first `period` values at index `period - 1`,
/// then `ema = (x - prev) * k + prev` with `k = 2 / (period + 1)`.
pub fn ema_line(points: &[LinePoint], period: usize) -> Vec<LinePoint> {
    if period == 0 || points.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut results = Vec::with_capacity(points.len() - period + 1);

    let initial_sum: f64 = points[..period].iter().map(|p| p.value).sum();
    let mut previous_ema = initial_sum / period as f64;
    results.push(LinePoint { time: points[period - 1].time, value: previous_ema });

    for point in &points[period..] {
        previous_ema = (point.value - previous_ema) * multiplier + previous_ema;
        results.push(LinePoint { time: point.time, value: previous_ema });
    }
    results
}

pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl IndicatorCalculator for Ema {
    type Output = Vec<LinePoint>;

    fn name(&self) -> String {
        format!("EMA({})", self.period)
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Candle]) -> Vec<LinePoint> {
        ema(data, self.period)
    }
}
