//! /start and /help command plugin.

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

use crate::bot::dispatcher::ThrottledBot;
use crate::plugins::Command;

const USAGE: &str = "<b>Sweeper</b> cleans up spam in groups.

<b>How to use:</b>
1. Reply to a message with /mark to add it to your selection.
2. Reply to the last one with /cleanup, or run /cleanup alone.
3. Pick what else should happen to the authors and press Delete.

From the dialog you can report the messages as spam, delete every
recent message of the authors, and ban or restrict them.

You need the right to delete messages to use these commands.";

/// Handle the /start command.
pub async fn start_handler(bot: ThrottledBot, msg: Message) -> anyhow::Result<()> {
    bot.send_message(msg.chat.id, USAGE)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle the /help command.
pub async fn help_handler(bot: ThrottledBot, msg: Message) -> anyhow::Result<()> {
    let text = format!("{}\n\n{}", USAGE, Command::descriptions());
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
