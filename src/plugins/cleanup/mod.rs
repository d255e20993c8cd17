//! Cleanup dialog handlers.
//!
//! `/mark` and `/unmark` manage the pending selection, `/cleanup` opens a
//! dialog over it and the `cl:` callbacks drive the dialog until the
//! moderator confirms or cancels.

pub mod render;

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{
    Chat, ChatKind, InlineKeyboardMarkup, Me, MessageId, ParseMode, PublicChatKind,
    ReplyParameters, UserId,
};
use tracing::{debug, info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::moderation::callback::{self, PREFIX};
use crate::moderation::entries::build_entries;
use crate::moderation::{Author, BannedRights, Dialog, DialogCommand, ScopedMessage, StaticConfig, TargetScope};
use crate::plugins::executor::{self, Submission};
use crate::plugins::selection::MarkResult;
use crate::utils::{full_name, html_escape, is_group, mention};

/// How long status replies stay in the chat.
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Capture a message and its author for a cleanup scope.
///
/// Messages sent on behalf of a chat carry no author.
pub fn scoped_message(msg: &Message) -> ScopedMessage {
    let author = match (&msg.sender_chat, &msg.from) {
        (None, Some(user)) => Some(Author {
            id: user.id,
            name: full_name(&user.first_name, user.last_name.as_deref()),
        }),
        _ => None,
    };

    ScopedMessage { id: msg.id, author }
}

fn is_forum(chat: &Chat) -> bool {
    match &chat.kind {
        ChatKind::Public(public) => match &public.kind {
            PublicChatKind::Supergroup(supergroup) => supergroup.is_forum,
            _ => false,
        },
        ChatKind::Private(_) => false,
    }
}

/// Send a reply that removes itself after a few seconds.
async fn notice(bot: &ThrottledBot, msg: &Message, text: &str) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let sent = bot
        .send_message(chat_id, text)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    let bot = bot.clone();
    tokio::spawn(async move {
        tokio::time::sleep(NOTICE_TTL).await;
        let _ = bot.delete_message(chat_id, sent.id).await;
    });

    Ok(())
}

/// Whether the sender of `msg` may delete messages in its chat.
async fn check_moderator(bot: &ThrottledBot, msg: &Message, state: &AppState) -> anyhow::Result<Option<UserId>> {
    if !is_group(msg) {
        return Ok(None);
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(None);
    };

    if !state
        .permissions
        .can_delete_messages(msg.chat.id, user.id)
        .await
        .unwrap_or(false)
    {
        notice(bot, msg, "❌ You need the right to delete messages.").await?;
        return Ok(None);
    }

    Ok(Some(user.id))
}

/// Handle /mark - add the replied message to the pending selection.
pub async fn mark_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some(moderator) = check_moderator(&bot, &msg, &state).await? else {
        return Ok(());
    };

    let Some(reply) = msg.reply_to_message() else {
        notice(&bot, &msg, "❌ Reply to the message you want to mark.").await?;
        return Ok(());
    };

    let text = match state
        .selections
        .mark(msg.chat.id, moderator, scoped_message(reply))
    {
        MarkResult::Added(count) => format!("📌 Marked. {} pending, run /cleanup when ready.", count),
        MarkResult::AlreadyMarked(count) => format!("📌 Already marked. {} pending.", count),
        MarkResult::Full => "❌ Selection is full, run /cleanup first.".to_string(),
    };

    let _ = bot.delete_message(msg.chat.id, msg.id).await;
    let sent = bot.send_message(msg.chat.id, text).await?;
    let chat_id = msg.chat.id;
    tokio::spawn(async move {
        tokio::time::sleep(NOTICE_TTL).await;
        let _ = bot.delete_message(chat_id, sent.id).await;
    });

    Ok(())
}

/// Handle /unmark - drop the pending selection.
pub async fn unmark_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some(moderator) = check_moderator(&bot, &msg, &state).await? else {
        return Ok(());
    };

    let dropped = state.selections.clear(msg.chat.id, moderator);
    let text = if dropped == 0 {
        "ℹ️ Nothing was marked.".to_string()
    } else {
        format!("🗑 Dropped {} marked messages.", dropped)
    };
    notice(&bot, &msg, &text).await
}

/// Handle /cleanup - open a dialog over the marked and replied messages.
pub async fn cleanup_command(bot: ThrottledBot, msg: Message, state: AppState, me: Me) -> anyhow::Result<()> {
    let Some(moderator) = check_moderator(&bot, &msg, &state).await? else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let replied = msg.reply_to_message().map(scoped_message);
    let messages = state.selections.take(chat_id, moderator, replied);
    if messages.is_empty() {
        notice(&bot, &msg, "❌ Reply to a message or /mark some first.").await?;
        return Ok(());
    }

    let _ = bot.delete_message(chat_id, msg.id).await;

    // Admins are never punished, their messages are still deleted.
    let mut exempt = vec![moderator, me.id];
    for author in messages.iter().filter_map(|m| m.author.as_ref()) {
        if !exempt.contains(&author.id)
            && state.permissions.is_admin(chat_id, author.id).await.unwrap_or(false)
        {
            exempt.push(author.id);
        }
    }
    let scope = TargetScope::new(chat_id, messages, &exempt);

    let can_ban = scope.user_count() > 0
        && state
            .permissions
            .can_ban(chat_id, moderator, me.id)
            .await
            .unwrap_or(false);

    let (baseline, is_forum) = match bot.get_chat(chat_id).await {
        Ok(chat) => (
            chat.permissions().map(BannedRights::from_chat_permissions),
            is_forum(&chat),
        ),
        Err(e) => {
            debug!("Could not load default permissions of {}: {}", chat_id, e);
            (None, is_forum(&msg.chat))
        }
    };

    let config = StaticConfig {
        can_ban,
        baseline,
        is_forum,
    };
    let dialog = state.dialogs.open(scope, config, moderator);
    let entries = dialog.entries();
    let snapshot = dialog.snapshot();

    let sent = bot
        .send_message(chat_id, render::render_text(&entries))
        .parse_mode(ParseMode::Html)
        .reply_markup(render::render_keyboard(dialog.id(), &entries, snapshot.ban_fully))
        .await?;

    info!(
        "Cleanup dialog {} opened by {} in {} over {} messages",
        dialog.id(),
        moderator,
        chat_id,
        snapshot.scope.messages().len()
    );

    spawn_renderer(bot, &dialog, sent.id);
    Ok(())
}

/// Re-render the keyboard for every snapshot the dialog publishes.
///
/// Ends once the dialog is dropped.
fn spawn_renderer(bot: ThrottledBot, dialog: &Dialog, message_id: MessageId) {
    let mut rx = dialog.subscribe();
    let config = *dialog.config();
    let id = dialog.id();

    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            let entries = build_entries(&snapshot, &config);
            let chat_id = snapshot.scope.chat_id;

            if let Err(e) = bot
                .edit_message_text(chat_id, message_id, render::render_text(&entries))
                .parse_mode(ParseMode::Html)
                .reply_markup(render::render_keyboard(id, &entries, snapshot.ban_fully))
                .await
            {
                debug!("Could not render dialog {}: {}", id, e);
            }
        }
        debug!("Renderer of dialog {} stopped", id);
    });
}

/// Whether callback data belongs to a cleanup dialog.
pub fn is_cleanup_callback(q: &CallbackQuery) -> bool {
    q.data.as_deref().is_some_and(|d| d.starts_with(PREFIX))
}

/// Handle `cl:` callbacks.
pub async fn cleanup_callback(bot: ThrottledBot, q: CallbackQuery, state: AppState) -> anyhow::Result<()> {
    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    let (id, command) = match callback::decode(data) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Bad cleanup callback from {}: {}", q.from.id, e);
            bot.answer_callback_query(&q.id)
                .text("❌ Unknown button.")
                .show_alert(true)
                .await?;
            return Ok(());
        }
    };

    let Some(dialog) = state.dialogs.get(id) else {
        bot.answer_callback_query(&q.id)
            .text("⌛ This cleanup has expired.")
            .await?;
        if let Some(msg) = &q.message {
            let _ = bot
                .edit_message_reply_markup(msg.chat().id, msg.id())
                .reply_markup(InlineKeyboardMarkup::default())
                .await;
        }
        return Ok(());
    };

    if q.from.id != dialog.owner() {
        bot.answer_callback_query(&q.id)
            .text("❌ Only the moderator who opened this cleanup can use it.")
            .show_alert(true)
            .await?;
        return Ok(());
    }

    match command {
        DialogCommand::Apply(action) => {
            dialog.dispatch(&action);
            bot.answer_callback_query(&q.id).await?;
        }
        DialogCommand::Noop => {
            bot.answer_callback_query(&q.id)
                .text("🔒 This right is restricted for the whole group.")
                .await?;
        }
        DialogCommand::Cancel => {
            state.dialogs.close(id);
            bot.answer_callback_query(&q.id).text("Cancelled.").await?;
            if let Some(msg) = &q.message {
                let _ = bot.delete_message(msg.chat().id, msg.id()).await;
            }
        }
        DialogCommand::Confirm => confirm(&bot, &q, &state, dialog).await?,
    }

    Ok(())
}

async fn confirm(bot: &ThrottledBot, q: &CallbackQuery, state: &AppState, dialog: Arc<Dialog>) -> anyhow::Result<()> {
    if !dialog.begin_submit() {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    }
    state.dialogs.close(dialog.id());

    let snapshot = dialog.snapshot();
    let chat_id = snapshot.scope.chat_id;

    // Rights may have changed while the dialog was open.
    state.permissions.invalidate(chat_id, dialog.owner());
    if !state
        .permissions
        .can_delete_messages(chat_id, dialog.owner())
        .await
        .unwrap_or(false)
    {
        bot.answer_callback_query(&q.id)
            .text("❌ You no longer have the right to delete messages.")
            .show_alert(true)
            .await?;
        if let Some(msg) = &q.message {
            let _ = bot.delete_message(msg.chat().id, msg.id()).await;
        }
        return Ok(());
    }

    let requests = dialog.plan();
    let summary = render::render_summary(&requests);
    let submission = Submission {
        moderator: dialog.owner(),
        scope: snapshot.scope.clone(),
    };

    info!(
        "Cleanup dialog {} confirmed by {} with {} requests",
        dialog.id(),
        dialog.owner(),
        requests.len()
    );
    executor::execute(bot, state, &submission, requests);

    bot.answer_callback_query(&q.id).text("Done.").await?;

    // Completion: swap the dialog for a short summary.
    if let Some(msg) = &q.message {
        let (chat, message_id) = (msg.chat().id, msg.id());
        let text = format!("{}\n\n<i>By {}</i>", html_escape(&summary), mention(q.from.id, &q.from.first_name));
        bot.edit_message_text(chat, message_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(InlineKeyboardMarkup::default())
            .await?;

        let bot = bot.clone();
        tokio::spawn(async move {
            tokio::time::sleep(NOTICE_TTL).await;
            let _ = bot.delete_message(chat, message_id).await;
        });
    }

    Ok(())
}
