// Simple Moving Average (SMA) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::{Candle, LinePoint};

/// Mean close of each trailing `period` window, stamped at the window's last
/// candle. Output length is `n - period + 1`, or empty when `n < period`.
pub fn sma(data: &[Candle], period: usize) -> Vec<LinePoint> {
    if period == 0 || data.len() < period {
        return Vec::new();
    }
    data.windows(period)
        .map(|window| {
            let sum: f64 = window.iter().map(|c| c.close).sum();
            LinePoint { time: window[period - 1].time, value: sum / period as f64 }
        })
        .collect()
}

pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl IndicatorCalculator for Sma {
    type Output = Vec<LinePoint>;

    fn name(&self) -> String {
        format!("SMA({})", self.period)
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Candle]) -> Vec<LinePoint> {
        sma(data, self.period)
    }
}
