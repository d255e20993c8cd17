//! Cache sizing and expiry presets.

use std::time::Duration;

/// Capacity and expiry of a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub max_capacity: u64,

    /// Evict entries this long after insertion.
    pub ttl: Option<Duration>,

    /// Evict entries not read for this long.
    pub tti: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Some(Duration::from_secs(300)), // 5 minutes
            tti: None,
        }
    }
}

impl CacheConfig {
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }

    #[must_use]
    pub fn tti(mut self, duration: Duration) -> Self {
        self.tti = Some(duration);
        self
    }

    /// Admin rights change rarely but must not linger after a demotion.
    pub fn admin_rights() -> Self {
        Self::with_capacity(10_000)
            .ttl(Duration::from_secs(300))
            .tti(Duration::from_secs(120))
    }

    /// Open dialogs: an hour at most, dropped after 15 idle minutes.
    pub fn dialog_sessions() -> Self {
        Self::with_capacity(5_000)
            .ttl(Duration::from_secs(3600))
            .tti(Duration::from_secs(900))
    }
}
