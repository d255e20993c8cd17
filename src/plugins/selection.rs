//! Pending message selections.
//!
//! `/mark` collects messages per moderator and chat until `/cleanup`
//! opens a dialog over them.

use std::sync::Arc;

use dashmap::DashMap;
use teloxide::types::{ChatId, UserId};

use crate::moderation::ScopedMessage;

/// Cap per selection, Telegram deletes at most 100 messages per request.
pub const MAX_SELECTION: usize = 100;

type SelectionKey = (i64, u64); // (chat_id, moderator_id)

/// Outcome of [`SelectionTracker::mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkResult {
    Added(usize),
    AlreadyMarked(usize),
    Full,
}

#[derive(Clone, Default)]
pub struct SelectionTracker {
    pending: Arc<DashMap<SelectionKey, Vec<ScopedMessage>>>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `message` to the moderator's selection in `chat_id`.
    pub fn mark(&self, chat_id: ChatId, moderator: UserId, message: ScopedMessage) -> MarkResult {
        let mut entry = self.pending.entry((chat_id.0, moderator.0)).or_default();
        if entry.iter().any(|m| m.id == message.id) {
            return MarkResult::AlreadyMarked(entry.len());
        }
        if entry.len() >= MAX_SELECTION {
            return MarkResult::Full;
        }
        entry.push(message);
        MarkResult::Added(entry.len())
    }

    /// Drop the selection, returning how many messages it held.
    pub fn clear(&self, chat_id: ChatId, moderator: UserId) -> usize {
        self.pending
            .remove(&(chat_id.0, moderator.0))
            .map(|(_, messages)| messages.len())
            .unwrap_or(0)
    }

    /// Remove the selection and append `extra` unless already present.
    pub fn take(
        &self,
        chat_id: ChatId,
        moderator: UserId,
        extra: Option<ScopedMessage>,
    ) -> Vec<ScopedMessage> {
        let mut messages = self
            .pending
            .remove(&(chat_id.0, moderator.0))
            .map(|(_, messages)| messages)
            .unwrap_or_default();

        if let Some(extra) = extra {
            if !messages.iter().any(|m| m.id == extra.id) && messages.len() < MAX_SELECTION {
                messages.push(extra);
            }
        }
        messages
    }
}
