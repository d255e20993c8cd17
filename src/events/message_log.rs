//! Records group messages so a user's recent history can be deleted.

use teloxide::prelude::*;
use tracing::{debug, warn};

use crate::bot::dispatcher::AppState;
use crate::utils::is_group;

/// Record the message in the background (runs before all handlers).
///
/// Messages sent on behalf of a chat are skipped, they can't be traced
/// back to a member.
pub async fn log_message(msg: Message, state: AppState) {
    if !is_group(&msg) || msg.sender_chat.is_some() {
        return;
    }
    let Some(user) = msg.from.as_ref() else {
        return;
    };
    if user.is_bot {
        return;
    }

    let (chat_id, user_id, message_id) = (msg.chat.id.0, user.id.0, msg.id.0);
    tokio::spawn(async move {
        match state.message_log.record(chat_id, user_id, message_id).await {
            Ok(()) => debug!("Logged message {} of {} in {}", message_id, user_id, chat_id),
            Err(e) => warn!("Failed to log message {} in {}: {}", message_id, chat_id, e),
        }
    });
}
