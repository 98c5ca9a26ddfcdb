use eyre::Result;
use floor_watch_bot::config::{BotConfig, DEFAULT_COLLECTION_PAGE_URL};
use floor_watch_bot::marketplace::GetgemsClient;
use floor_watch_bot::message::MessageFormatter;
use floor_watch_bot::notify::TelegramNotifier;
use floor_watch_bot::FloorWatcher;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the filter so RUST_LOG can live there too
    dotenvy::dotenv().ok();
    let config = BotConfig::from_env();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .init();

    let config = config?;
    config.validate()?;
    info!("Starting floor watch with configuration:");
    info!("{}", config.summary());

    let source = GetgemsClient::new(&config.marketplace_url, &config.collection_address)?;
    let notifier = TelegramNotifier::new(&config.telegram_api_url, &config.bot_token, &config.group_id)?;
    let formatter = MessageFormatter::new(DEFAULT_COLLECTION_PAGE_URL, &config.collection_address);

    let watcher = Arc::new(FloorWatcher::new(
        Arc::new(source),
        Arc::new(notifier),
        formatter,
        config.poll_interval(),
    ));

    info!("Bot is running... Press Ctrl+C to stop");

    tokio::select! {
        _ = watcher.clone().run() => {}
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => {
                info!("📊 Final Statistics:\n{}", watcher.stats().summary());
                info!("👋 Shutting down gracefully...");
            }
            Err(err) => {
                error!("Unable to listen for shutdown signal: {}", err);
                watcher.clone().run().await;
            }
        }
    }

    Ok(())
}
