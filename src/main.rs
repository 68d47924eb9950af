use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use storefront::bot::{self, AppState};
use storefront::config::Config;
use storefront::health;
use storefront::localization::init_localization;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Storefront Telegram Bot");

    // Missing required configuration aborts startup with a descriptive error
    let config = Config::from_env()?;
    init_localization()?;

    // Liveness endpoint for the hosting platform, alongside the dispatcher
    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(health_port).await {
            error!(error = %e, "Health check server stopped");
        }
    });

    // Initialize the bot
    let bot = Bot::new(config.bot_token.clone());
    let state = Arc::new(AppState::new(config, bot.clone()));

    info!("Bot initialized, starting dispatcher");

    // Set up the dispatcher with shared application state
    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let state = Arc::clone(&state);
            move |msg: Message| {
                let state = Arc::clone(&state);
                async move { bot::message_handler(msg, state).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let state = Arc::clone(&state);
            move |q: CallbackQuery| {
                let state = Arc::clone(&state);
                async move { bot::callback_handler(q, state).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
