use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One OHLCV sample for a fixed time bucket. `time` is the bucket open in
/// seconds since the epoch and is the key within a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        crate::utils::secs_to_datetime(self.time)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1w")]
    Week1,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 8] = [
        TimeFrame::Minute1,
        TimeFrame::Minute5,
        TimeFrame::Minute15,
        TimeFrame::Minute30,
        TimeFrame::Hour1,
        TimeFrame::Hour4,
        TimeFrame::Day1,
        TimeFrame::Week1,
    ];

    /// Exchange interval string, e.g. "15m".
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Minute1 => "1m",
            TimeFrame::Minute5 => "5m",
            TimeFrame::Minute15 => "15m",
            TimeFrame::Minute30 => "30m",
            TimeFrame::Hour1 => "1h",
            TimeFrame::Hour4 => "4h",
            TimeFrame::Day1 => "1d",
            TimeFrame::Week1 => "1w",
        }
    }

    pub fn duration_secs(&self) -> i64 {
        match self {
            TimeFrame::Minute1 => 60,
            TimeFrame::Minute5 => 5 * 60,
            TimeFrame::Minute15 => 15 * 60,
            TimeFrame::Minute30 => 30 * 60,
            TimeFrame::Hour1 => 3_600,
            TimeFrame::Hour4 => 4 * 3_600,
            TimeFrame::Day1 => 86_400,
            TimeFrame::Week1 => 7 * 86_400,
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeFrame::ALL
            .iter()
            .copied()
            .find(|tf| tf.as_str() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("Unknown timeframe '{}'", s))
    }
}

// --- Indicator configuration ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RsiSettings {
    pub enabled: bool,
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiSettings {
    fn default() -> Self {
        Self { enabled: false, period: 14, overbought: 70.0, oversold: 30.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MacdSettings {
    pub enabled: bool,
    #[serde(alias = "fast_period")]
    pub fast_period: usize,
    #[serde(alias = "slow_period")]
    pub slow_period: usize,
    #[serde(alias = "signal_period")]
    pub signal_period: usize,
}

impl Default for MacdSettings {
    fn default() -> Self {
        Self { enabled: false, fast_period: 12, slow_period: 26, signal_period: 9 }
    }
}

/// Settings for a single-period moving average (SMA or EMA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingAverageSettings {
    pub enabled: bool,
    pub period: usize,
}

impl Default for MovingAverageSettings {
    fn default() -> Self {
        Self { enabled: false, period: 20 }
    }
}

/// Which indicators to draw and with what parameters. Owned by the caller and
/// passed by value; carries no derived state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub rsi: RsiSettings,
    pub macd: MacdSettings,
    pub sma: MovingAverageSettings,
    pub ema: MovingAverageSettings,
}

// --- Indicator output ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistogramTone {
    Positive,
    Negative,
}

impl HistogramTone {
    /// Zero counts as positive.
    pub fn of(value: f64) -> Self {
        if value >= 0.0 {
            HistogramTone::Positive
        } else {
            HistogramTone::Negative
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            HistogramTone::Positive => "positive",
            HistogramTone::Negative => "negative",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            HistogramTone::Positive => "rgba(38, 166, 154, 0.7)",
            HistogramTone::Negative => "rgba(239, 83, 80, 0.7)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramPoint {
    pub time: i64,
    pub value: f64,
    pub tone: HistogramTone,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RsiOutput {
    pub values: Vec<LinePoint>,
    pub overbought: f64,
    pub oversold: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MacdOutput {
    pub macd: Vec<LinePoint>,
    pub signal: Vec<LinePoint>,
    pub histogram: Vec<HistogramPoint>,
}

impl MacdOutput {
    pub fn is_empty(&self) -> bool {
        self.macd.is_empty() && self.signal.is_empty() && self.histogram.is_empty()
    }
}

/// Bundle of every enabled indicator curve for one recomputation pass.
/// `None` marks a disabled indicator; an enabled one with too little data
/// is `Some` with empty series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub rsi: Option<RsiOutput>,
    pub macd: Option<MacdOutput>,
    pub sma: Option<Vec<LinePoint>>,
    pub ema: Option<Vec<LinePoint>>,
}

/// Live feed connection state as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        };
        f.write_str(s)
    }
}
