//! Configuration module for Sweeper bot.
//!
//! Loads configuration from environment variables.

use std::env;

use serde::Deserialize;
use thiserror::Error;

/// Bot running mode
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Errors raised while reading the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("WEBHOOK_URL must be set when BOT_MODE is webhook")]
    WebhookUrlMissing,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Owner user IDs (comma-separated)
    /// These users may open cleanup dialogs in any chat.
    pub owner_ids: Vec<u64>,

    /// Chat that receives forwarded spam reports.
    pub report_chat_id: Option<i64>,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let bot_mode = match lookup("BOT_MODE")
            .unwrap_or_else(|| "polling".to_string())
            .to_lowercase()
            .as_str()
        {
            "webhook" => BotMode::Webhook,
            _ => BotMode::Polling,
        };

        let webhook_url = lookup("WEBHOOK_URL").filter(|s| !s.is_empty());
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            return Err(ConfigError::WebhookUrlMissing);
        }

        let webhook_port = match lookup("WEBHOOK_PORT") {
            Some(port) => port.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "WEBHOOK_PORT",
                value: port,
            })?,
            None => 8443,
        };

        let report_chat_id = match lookup("REPORT_CHAT_ID").filter(|s| !s.trim().is_empty()) {
            Some(id) => Some(id.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "REPORT_CHAT_ID",
                value: id,
            })?),
            None => None,
        };

        // Parse owner IDs
        let owner_ids = lookup("OWNER_IDS")
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| s.trim().parse::<u64>().ok())
            .collect();

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret: lookup("WEBHOOK_SECRET").filter(|s| !s.is_empty()),
            owner_ids,
            report_chat_id,
            mongodb_uri: required("MONGODB_URI")?,
            mongodb_database: lookup("MONGODB_DATABASE").unwrap_or_else(|| "sweeper".to_string()),
        })
    }
}
