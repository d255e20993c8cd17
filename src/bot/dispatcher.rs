//! Message dispatcher setup.
//!
//! Builds the dispatcher with the command, callback and event handlers.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::cache::CacheRegistry;
use crate::config::Config;
use crate::database::{Database, MessageLogRepository, SpamReportRepository};
use crate::events;
use crate::moderation::DialogStore;
use crate::permissions::Permissions;
use crate::plugins;
use crate::plugins::selection::SelectionTracker;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Dispatcher type used by both runners.
pub type BotDispatcher = Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Permission checker with admin caching.
    pub permissions: Permissions,

    /// Open cleanup dialogs.
    pub dialogs: DialogStore,

    /// Messages marked with /mark, per moderator.
    pub selections: SelectionTracker,

    /// Logged group messages.
    pub message_log: Arc<MessageLogRepository>,

    /// Filed spam reports.
    pub spam_reports: Arc<SpamReportRepository>,

    /// Chat receiving forwarded spam reports.
    pub report_chat_id: Option<i64>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(bot: &ThrottledBot, db: &Database, cache: Arc<CacheRegistry>, config: &Config) -> Self {
        // Permissions needs the inner Bot for API calls
        let permissions =
            Permissions::with_owners(bot.inner().clone(), cache.clone(), config.owner_ids.clone());

        Self {
            permissions,
            dialogs: DialogStore::new(&cache),
            selections: SelectionTracker::new(),
            message_log: Arc::new(MessageLogRepository::new(db)),
            spam_reports: Arc::new(SpamReportRepository::new(db)),
            report_chat_id: config.report_chat_id,
        }
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(bot: ThrottledBot, state: AppState) -> BotDispatcher {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    // Message logging first, then commands
    let message_handler = Update::filter_message()
        .inspect_async(events::log_message)
        .branch(plugins::command_handler());

    dptree::entry()
        .branch(message_handler)
        .branch(plugins::callback_handler())
}
