//! Crypto Portfolio Bot for Telegram - Main executable
//!
//! Tracks a watchlist of crypto assets with the user's holdings, keeps prices
//! fresh from CoinGecko and shows the portfolio value and its distribution.
use anyhow::Context;
use crypto_portfolio_bot::commands::BotCommands;
use crypto_portfolio_bot::services::spawn_sync_notifier;
use crypto_portfolio_bot::{
    AppConfig, CoinGeckoClient, FileStorage, KeyValueStorage, PersistenceAdapter,
    PostgresStorage, Router, ServiceContainer, WatchlistStore,
};
use dotenv::dotenv;
use log::{error, info, warn};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use teloxide::{dptree, prelude::*, types::ChatId, utils::command::BotCommands as _, Bot};

/// Application entry point
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging with default level of "info"
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    info!(
        "Starting Crypto Portfolio Telegram Bot v{}",
        crypto_portfolio_bot::VERSION
    );

    let config = AppConfig::from_env().context("Invalid configuration in environment variables")?;

    // Create Telegram bot instance
    let bot = Bot::new(config.telegram_bot_token.clone());

    let storage: Arc<dyn KeyValueStorage> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .context("Failed to create database connection pool")?;

            info!("Running database migrations...");
            if let Err(e) = sqlx::migrate!("./migrations").run(&db_pool).await {
                error!("Failed to run migrations: {}", e);
                return Err(anyhow::Error::from(e));
            }
            info!("Migrations completed successfully");

            Arc::new(PostgresStorage::new(Arc::new(db_pool)))
        }
        None => {
            info!("No DATABASE_URL set, storing data in {}", config.data_dir);
            Arc::new(FileStorage::new(&config.data_dir))
        }
    };

    // Restore the watchlist and keep it saved
    let persistence = Arc::new(PersistenceAdapter::new(storage, config.storage_key.clone()));
    let store = Arc::new(WatchlistStore::with_state(persistence.load().await));
    let autosave = persistence.clone().spawn_autosave(store.subscribe());

    let provider = Arc::new(
        CoinGeckoClient::new(config.market_config()).context("Failed to create market client")?,
    );

    let poll_interval = config.poll_interval();
    let owner_chat_id = config.owner_chat_id;
    let service_container = Arc::new(ServiceContainer::new(
        config,
        store.clone(),
        provider,
        persistence.clone(),
    ));

    // Start price polling
    let coordinator = service_container.coordinator();
    coordinator.start_polling(poll_interval);

    if let Some(chat_id) = owner_chat_id {
        spawn_sync_notifier(bot.clone(), ChatId(chat_id), coordinator.subscribe_status());
    }

    if let Err(e) = bot.set_my_commands(BotCommands::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    // Initialize the application components
    info!("Initializing bot application...");
    let (router, bot, service_container, dialogue_storage) =
        crypto_portfolio_bot::create_application(bot, service_container);

    // Get the handler from the router
    let handler = router.setup_handlers();

    // Build dispatcher with dependency injections and control-C handling
    let mut dispatcher = teloxide::dispatching::Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![service_container, dialogue_storage])
        .enable_ctrlc_handler()
        .build();

    info!("Bot is running! Press Ctrl+C to stop.");
    dispatcher.dispatch().await;

    // Stop polling and write the final snapshot
    info!("Stopping price polling...");
    coordinator.stop_polling().await;
    autosave.abort();
    if let Err(e) = persistence.save(&store.snapshot()).await {
        error!("Failed to save watchlist on shutdown: {}", e);
    }

    Ok(())
}
