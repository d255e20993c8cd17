//! Logged group messages, kept so a user's recent history can be wiped.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// One message sent by a user in a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedMessage {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Telegram chat ID (indexed with user_id)
    pub chat_id: i64,

    /// Telegram user ID
    pub user_id: i64,

    pub message_id: i32,

    /// Expiry is driven by a TTL index on this field.
    pub created_at: DateTime,
}

impl LoggedMessage {
    pub fn new(chat_id: i64, user_id: u64, message_id: i32) -> Self {
        Self {
            id: None,
            chat_id,
            user_id: user_id as i64,
            message_id,
            created_at: DateTime::now(),
        }
    }
}
