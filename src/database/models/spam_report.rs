//! Spam reports filed from cleanup dialogs.

use mongodb::bson::oid::ObjectId;
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamReport {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub chat_id: i64,

    /// Reported message IDs in selection order.
    pub message_ids: Vec<i32>,

    /// Authors implicated by the reported messages.
    #[serde(default)]
    pub user_ids: Vec<i64>,

    /// Moderator who filed the report.
    pub reported_by: i64,

    pub created_at: DateTime,
}

impl SpamReport {
    pub fn new(chat_id: i64, message_ids: Vec<i32>, user_ids: Vec<u64>, reported_by: u64) -> Self {
        Self {
            id: None,
            chat_id,
            message_ids,
            user_ids: user_ids.into_iter().map(|id| id as i64).collect(),
            reported_by: reported_by as i64,
            created_at: DateTime::now(),
        }
    }
}
