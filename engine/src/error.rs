use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    #[error("HTTP error: {source}")]
    HttpError {
        #[from]
        source: reqwest::Error,
    },

    // Historical fetch failed for a reason other than transport (bad payload, bad status).
    #[error("Historical fetch error: {0}")]
    FetchError(String),

    #[error("WebSocket error: {source}")]
    WebSocketError {
        #[from]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Session driver has stopped")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, EngineError>;
