//! Plugin system for command handlers.
//!
//! Add new plugins by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Adding the handler to `command_handler()`

pub mod cleanup;
pub mod executor;
pub mod selection;
pub mod start;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,

    #[command(description = "Show usage")]
    Help,

    #[command(description = "Mark the replied message for cleanup")]
    Mark,

    #[command(description = "Drop your marked messages")]
    Unmark,

    #[command(description = "Open the cleanup dialog")]
    Cleanup,
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start::start_handler))
        .branch(case![Command::Help].endpoint(start::help_handler))
        .branch(case![Command::Mark].endpoint(cleanup::mark_command))
        .branch(case![Command::Unmark].endpoint(cleanup::unmark_command))
        .branch(case![Command::Cleanup].endpoint(cleanup::cleanup_command))
}

/// Build the callback query handler.
pub fn callback_handler() -> UpdateHandler<anyhow::Error> {
    Update::filter_callback_query().branch(
        dptree::filter(|q: CallbackQuery| cleanup::is_cleanup_callback(&q))
            .endpoint(cleanup::cleanup_callback),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_lowercase() {
        assert!(matches!(Command::parse("/cleanup", "sweeper_bot"), Ok(Command::Cleanup)));
        assert!(matches!(Command::parse("/mark@sweeper_bot", "sweeper_bot"), Ok(Command::Mark)));
        assert!(Command::parse("/purge", "sweeper_bot").is_err());
    }
}
