//! Database models.

pub mod message_log;
pub mod spam_report;

pub use message_log::LoggedMessage;
pub use spam_report::SpamReport;
