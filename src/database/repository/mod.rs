//! Repository implementations.

pub mod message_log_repository;
pub mod spam_report_repository;

pub use message_log_repository::MessageLogRepository;
pub use spam_report_repository::SpamReportRepository;
