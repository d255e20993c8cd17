//! Message log repository.
//!
//! Every group message is recorded so a user's recent history can be
//! deleted later. Entries expire through a TTL index after 48 hours,
//! which matches how far back Telegram lets bots delete messages.

use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Collection, IndexModel};
use tracing::debug;

use crate::database::models::LoggedMessage;
use crate::database::Database;

/// Bots can't delete messages older than this.
pub const RETENTION: Duration = Duration::from_secs(48 * 60 * 60);

/// Repository for logged group messages.
pub struct MessageLogRepository {
    collection: Collection<LoggedMessage>,
}

impl MessageLogRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("message_log"),
        }
    }

    /// Create the lookup and expiry indexes.
    pub async fn ensure_indexes(&self) -> Result<()> {
        let lookup = IndexModel::builder()
            .keys(doc! { "chat_id": 1, "user_id": 1 })
            .build();
        let expiry = IndexModel::builder()
            .keys(doc! { "created_at": 1 })
            .options(IndexOptions::builder().expire_after(RETENTION).build())
            .build();

        self.collection.create_index(lookup).await?;
        self.collection.create_index(expiry).await?;
        debug!("Ensured message_log indexes");

        Ok(())
    }

    /// Record a message sent by `user_id` in `chat_id`.
    pub async fn record(&self, chat_id: i64, user_id: u64, message_id: i32) -> Result<()> {
        let entry = LoggedMessage::new(chat_id, user_id, message_id);
        self.collection.insert_one(&entry).await?;
        Ok(())
    }

    /// Remove and return the logged message IDs of a user in a chat.
    pub async fn take_user_messages(&self, chat_id: i64, user_id: u64) -> Result<Vec<i32>> {
        let raw_coll: Collection<Document> = self.collection.clone_with_type();
        let filter = doc! { "chat_id": chat_id, "user_id": user_id as i64 };
        let options = mongodb::options::FindOptions::builder()
            .projection(doc! { "message_id": 1, "_id": 0 })
            .sort(doc! { "message_id": 1 })
            .build();

        let mut cursor = raw_coll.find(filter.clone()).with_options(options).await?;
        let mut ids = Vec::new();

        while let Some(result) = cursor.next().await {
            if let Ok(doc) = result {
                if let Ok(id) = doc.get_i32("message_id") {
                    ids.push(id);
                }
            }
        }

        let removed = self.collection.delete_many(filter).await?;
        debug!(
            "Took {} logged messages of user {} in chat {} ({} removed)",
            ids.len(),
            user_id,
            chat_id,
            removed.deleted_count
        );

        Ok(ids)
    }
}
