//! Sweeper - Telegram group cleanup bot
//!
//! Moderators mark spam, then a single dialog deletes it, reports it and
//! deals with its authors.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB integration (message log, spam reports)
//! - `cache` - TTL caching with Moka
//! - `permissions` - Admin checking with caching
//! - `moderation` - Cleanup dialog state, entries and submission planning
//! - `bot` - Core bot functionality (with Throttle for API rate limiting)
//! - `plugins` - Command and callback handlers
//! - `events` - Event handlers
//! - `utils` - Utility functions

mod bot;
mod cache;
mod config;
mod database;
mod events;
mod moderation;
mod permissions;
mod plugins;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bot::AppState;
use cache::CacheRegistry;
use config::Config;
use database::Database;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so RUST_LOG from it applies
    dotenvy::dotenv().ok();

    // Default to info for our crate if RUST_LOG is not set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sweeper=info,teloxide=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting Sweeper bot...");

    let config = Config::from_env()?;
    info!("Bot mode: {:?}", config.bot_mode);

    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;

    let cache = Arc::new(CacheRegistry::new());

    // Bulk deletes and bans go through Throttle to stay under flood limits
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    if !config.owner_ids.is_empty() {
        info!("Bot owners: {:?}", config.owner_ids);
    }
    if config.report_chat_id.is_none() {
        info!("REPORT_CHAT_ID not set, spam reports are only stored");
    }

    let state = AppState::new(&bot, &db, cache.clone(), &config);
    state.message_log.ensure_indexes().await?;
    info!("Cache registry holds {} caches", cache.len());

    let dispatcher = bot::build_dispatcher(bot.clone(), state);
    bot::run(&config, bot, dispatcher).await
}
