// Engine settings, loaded from a JSON file or defaulted
use crate::error::{EngineError, Result};
use serde::Deserialize;
use shared::models::{IndicatorSettings, TimeFrame};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the JSON settings file.
pub const CONFIG_ENV_VAR: &str = "CHART_ENGINE_CONFIG";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub symbol: String,
    pub timeframe: TimeFrame,
    /// Candles requested by the initial load and by every backfill page.
    pub initial_candle_limit: usize,
    pub reconnect_delay_ms: u64,
    pub rest_base_url: String,
    pub ws_base_url: String,
    /// When set, history is served from this CSV file instead of the REST API.
    pub history_csv: Option<PathBuf>,
    pub streaming_enabled: bool,
    pub indicators: IndicatorSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            symbol: "BTCUSDT".to_string(),
            timeframe: TimeFrame::Hour1,
            initial_candle_limit: 500,
            reconnect_delay_ms: 5_000,
            rest_base_url: "https://api.binance.com".to_string(),
            ws_base_url: "wss://stream.binance.com:9443/ws".to_string(),
            history_csv: None,
            streaming_enabled: false,
            indicators: IndicatorSettings::default(),
        }
    }
}

impl EngineSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&raw)?;
        settings.validate()?;
        tracing::debug!(path = %path.display(), symbol = %settings.symbol, timeframe = %settings.timeframe, "Loaded engine settings");
        Ok(settings)
    }

    /// Reads the file named by `CHART_ENGINE_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => {
                tracing::info!("{} not set, using default engine settings", CONFIG_ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(EngineError::ConfigError("symbol must not be empty".to_string()));
        }
        if self.initial_candle_limit == 0 {
            return Err(EngineError::ConfigError("initial_candle_limit must be greater than 0".to_string()));
        }
        Ok(())
    }
}
