//! MACD (Moving Average Convergence Divergence) indicator.

use super::ema::{ema, ema_line};
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::{Candle, HistogramPoint, HistogramTone, LinePoint, MacdOutput};

/// MACD line, signal line and histogram.
///
/// The slow EMA starts `slow - fast` candles after the fast one, so the MACD
/// line pairs `fast[offset + j]` with `slow[j]` and carries the slow EMA's
/// timestamp. The signal line is an EMA of the MACD line; the histogram pairs
/// `macd[signal - 1 + k]` with `signal[k]`. If either EMA is empty every
/// output series is empty.
pub fn macd(data: &[Candle], fast_period: usize, slow_period: usize, signal_period: usize) -> MacdOutput {
    let fast_ema = ema(data, fast_period);
    let slow_ema = ema(data, slow_period);

    if fast_ema.is_empty() || slow_ema.is_empty() {
        return MacdOutput::default();
    }

    let offset = slow_period.saturating_sub(fast_period);
    let macd_line: Vec<LinePoint> = slow_ema
        .iter()
        .zip(fast_ema.iter().skip(offset))
        .map(|(slow, fast)| LinePoint { time: slow.time, value: fast.value - slow.value })
        .collect();

    let signal_line = ema_line(&macd_line, signal_period);

    let signal_offset = signal_period.saturating_sub(1);
    let histogram = macd_line
        .iter()
        .skip(signal_offset)
        .zip(&signal_line)
        .map(|(m, s)| {
            let value = m.value - s.value;
            HistogramPoint { time: m.time, value, tone: HistogramTone::of(value) }
        })
        .collect();

    MacdOutput { macd: macd_line, signal: signal_line, histogram }
}

/// MACD indicator.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self { fast_period, slow_period, signal_period }
    }
}

impl IndicatorCalculator for Macd {
    type Output = MacdOutput;

    fn name(&self) -> String {
        format!("MACD({},{},{})", self.fast_period, self.slow_period, self.signal_period)
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "fast_period": self.fast_period,
            "slow_period": self.slow_period,
            "signal_period": self.signal_period,
        })
    }

    fn calculate(&self, data: &[Candle]) -> MacdOutput {
        macd(data, self.fast_period, self.slow_period, self.signal_period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{candles_from_closes, SCENARIO_CLOSES};

    fn wave(n: usize) -> Vec<Candle> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1).collect();
        candles_from_closes(&closes)
    }

    #[test]
    fn test_macd_lengths_and_alignment() {
        let candles = wave(60);
        let out = Macd::new(12, 26, 9).calculate(&candles);
        assert_eq!(out.macd.len(), 60 - 26 + 1);
        assert_eq!(out.signal.len(), out.macd.len() - 9 + 1);
        assert_eq!(out.histogram.len(), out.signal.len());
        assert_eq!(out.macd[0].time, candles[25].time);
        assert_eq!(out.signal[0].time, out.macd[8].time);
        assert_eq!(out.histogram[0].time, out.macd[8].time);
    }

    #[test]
    fn test_macd_line_is_fast_minus_slow() {
        let candles = wave(40);
        let fast = ema(&candles, 5);
        let slow = ema(&candles, 10);
        let out = macd(&candles, 5, 10, 3);
        for (j, point) in out.macd.iter().enumerate() {
            assert_eq!(point.time, slow[j].time);
            assert_eq!(point.value, fast[5 + j].value - slow[j].value);
        }
    }

    #[test]
    fn test_macd_histogram_matches_recomputed_lines() {
        let candles = wave(50);
        let out = macd(&candles, 12, 26, 9);
        let macd_again = macd(&candles, 12, 26, 9).macd;
        let signal_again = ema_line(&macd_again, 9);
        for (k, bar) in out.histogram.iter().enumerate() {
            assert_eq!(bar.value, macd_again[8 + k].value - signal_again[k].value);
            assert_eq!(bar.tone, HistogramTone::of(bar.value));
        }
    }

    #[test]
    fn test_macd_insufficient_data_is_empty() {
        let candles = wave(25);
        let out = macd(&candles, 12, 26, 9);
        assert!(out.is_empty());
    }

    #[test]
    fn test_macd_without_enough_macd_points_has_no_signal() {
        // 26 candles -> one MACD point, too few for a 9-period signal.
        let candles = wave(26);
        let out = macd(&candles, 12, 26, 9);
        assert_eq!(out.macd.len(), 1);
        assert!(out.signal.is_empty());
        assert!(out.histogram.is_empty());
    }

    #[test]
    fn test_macd_scenario_small_periods() {
        let candles = candles_from_closes(&SCENARIO_CLOSES);
        let out = macd(&candles, 2, 3, 2);
        assert_eq!(out.macd.len(), 10);
        assert_eq!(out.signal.len(), 9);
        assert_eq!(out.histogram.len(), 9);
        // Rising tail: fast EMA leads the slow one, so the last bars are positive.
        assert!(out.macd.last().unwrap().value > 0.0);
    }

    #[test]
    fn test_macd_name() {
        assert_eq!(Macd::new(12, 26, 9).name(), "MACD(12,26,9)");
    }
}
