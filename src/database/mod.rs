//! Database module exports.

mod models;
mod mongo;
mod repository;

pub use models::SpamReport;
pub use mongo::Database;
pub use repository::{MessageLogRepository, SpamReportRepository};
