//! The messages and users a cleanup dialog acts on.

use teloxide::types::{ChatId, MessageId, UserId};

/// Author metadata captured when a message is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: UserId,
    pub name: String,
}

/// A message selected for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedMessage {
    pub id: MessageId,
    /// `None` for messages sent on behalf of a chat.
    pub author: Option<Author>,
}

/// Group, selected messages and the distinct users they implicate.
///
/// Immutable for the lifetime of a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetScope {
    pub chat_id: ChatId,
    messages: Vec<ScopedMessage>,
    users: Vec<UserId>,
}

impl TargetScope {
    /// Build a scope over `messages`, implicating every distinct author
    /// in order of first appearance except those in `exempt`.
    pub fn new(chat_id: ChatId, messages: Vec<ScopedMessage>, exempt: &[UserId]) -> Self {
        let mut users: Vec<UserId> = Vec::new();
        for author in messages.iter().filter_map(|m| m.author.as_ref()) {
            if !exempt.contains(&author.id) && !users.contains(&author.id) {
                users.push(author.id);
            }
        }

        Self {
            chat_id,
            messages,
            users,
        }
    }

    pub fn messages(&self) -> &[ScopedMessage] {
        &self.messages
    }

    pub fn message_ids(&self) -> Vec<MessageId> {
        self.messages.iter().map(|m| m.id).collect()
    }

    /// Implicated users in order of first appearance.
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn contains_user(&self, user: UserId) -> bool {
        self.users.contains(&user)
    }

    /// Resolve every implicated user against the message authors.
    ///
    /// The first message by a user wins; users without metadata are skipped.
    pub fn resolve_peers(&self) -> Vec<&Author> {
        self.users
            .iter()
            .filter_map(|user| {
                self.messages
                    .iter()
                    .filter_map(|m| m.author.as_ref())
                    .find(|author| author.id == *user)
            })
            .collect()
    }
}
