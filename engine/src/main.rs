// Engine main entry point
use anyhow::Context;
use engine::config::EngineSettings;
use engine::data::{CsvHistory, HistoryBackend};
use engine::feed::{BinanceKlineStream, BinanceRest};
use engine::services::{ChartSession, SessionDriver, TracingSink};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    info!("Starting chart engine...");

    let settings = EngineSettings::from_env().context("Failed to load engine settings")?;

    let history = match &settings.history_csv {
        Some(path) => HistoryBackend::Csv(
            CsvHistory::load(path).with_context(|| format!("Failed to load CSV history from {}", path.display()))?,
        ),
        None => HistoryBackend::Binance(BinanceRest::new(settings.rest_base_url.clone())),
    };
    let transport = BinanceKlineStream::new(settings.ws_base_url.clone());

    let session = ChartSession::new(&settings);
    info!(session_id = %session.id(), symbol = %settings.symbol, timeframe = %settings.timeframe, "Chart session created");
    let (driver, handle) = SessionDriver::new(session, history, transport, TracingSink);

    if settings.streaming_enabled {
        handle.enable_streaming()?;
    }

    let running = tokio::spawn(driver.run());

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("Ctrl-C received, shutting down");
    handle.shutdown()?;
    running.await.context("Session driver panicked")?;

    Ok(())
}
