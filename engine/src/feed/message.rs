// Parsing of kline stream messages into live samples
use super::LiveSample;
use serde::Deserialize;
use shared::models::TimeFrame;

#[derive(Debug, Deserialize)]
struct KlineEnvelope {
    #[serde(rename = "e")]
    event_type: String,
    #[serde(rename = "k")]
    kline: KlinePayload,
}

// Prices arrive as decimal strings.
#[derive(Debug, Deserialize)]
struct KlinePayload {
    #[serde(rename = "t")]
    open_time: i64,
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "i")]
    interval: String,
    #[serde(rename = "o")]
    open: String,
    #[serde(rename = "h")]
    high: String,
    #[serde(rename = "l")]
    low: String,
    #[serde(rename = "c")]
    close: String,
    #[serde(rename = "v")]
    volume: String,
    #[serde(rename = "x", default)]
    is_closed: bool,
}

/// Returns `None` for anything that is not a well-formed kline event:
/// bad JSON, another event type, an unknown interval or a non-numeric price.
pub fn parse_kline_message(text: &str) -> Option<LiveSample> {
    let envelope: KlineEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring non-kline stream message");
            return None;
        }
    };
    if envelope.event_type != "kline" {
        tracing::debug!(event_type = %envelope.event_type, "Ignoring stream event");
        return None;
    }

    let k = envelope.kline;
    let timeframe = k.interval.parse::<TimeFrame>().ok()?;
    let number = |raw: &str| raw.trim().parse::<f64>().ok().filter(|v| v.is_finite());

    Some(LiveSample {
        symbol: k.symbol,
        timeframe,
        open_time_ms: k.open_time,
        open: number(&k.open)?,
        high: number(&k.high)?,
        low: number(&k.low)?,
        close: number(&k.close)?,
        volume: number(&k.volume)?,
        is_closed: k.is_closed,
    })
}
