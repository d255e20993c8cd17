//! Spam report repository.

use anyhow::Result;
use mongodb::Collection;
use tracing::debug;

use crate::database::models::SpamReport;
use crate::database::Database;

/// Repository for filed spam reports.
pub struct SpamReportRepository {
    collection: Collection<SpamReport>,
}

impl SpamReportRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("spam_reports"),
        }
    }

    /// Store a report.
    pub async fn insert(&self, report: &SpamReport) -> Result<()> {
        self.collection.insert_one(report).await?;
        debug!(
            "Stored spam report for {} messages in chat {}",
            report.message_ids.len(),
            report.chat_id
        );
        Ok(())
    }
}
