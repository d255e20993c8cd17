//! Permission checker with caching.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMember, ChatMemberKind, UserId};
use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};

/// Cached admin rights relevant to cleanup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminInfo {
    pub can_delete_messages: bool,
    pub can_restrict_members: bool,
}

impl AdminInfo {
    /// Extract admin rights from a chat member, `None` for regular members.
    pub fn from_chat_member(member: &ChatMember) -> Option<Self> {
        match &member.kind {
            ChatMemberKind::Owner(_) => Some(Self::full()),
            ChatMemberKind::Administrator(admin) => Some(Self {
                can_delete_messages: admin.can_delete_messages,
                can_restrict_members: admin.can_restrict_members,
            }),
            _ => None,
        }
    }

    /// Every right, used for chat owners and bot owners.
    fn full() -> Self {
        Self {
            can_delete_messages: true,
            can_restrict_members: true,
        }
    }
}

/// Cache key for admin lookups.
type AdminCacheKey = (i64, u64); // (chat_id, user_id)

/// Permission checker with caching support.
///
/// Bot owners (from OWNER_IDS env) pass every check.
#[derive(Clone)]
pub struct Permissions {
    bot: Bot,
    cache: TypedCache<AdminCacheKey, Option<AdminInfo>>,
    owner_ids: Vec<u64>,
}

impl Permissions {
    pub fn with_owners(bot: Bot, cache_registry: Arc<CacheRegistry>, owner_ids: Vec<u64>) -> Self {
        let cache = cache_registry.get_or_create("admin_permissions", CacheConfig::admin_rights());

        Self { bot, cache, owner_ids }
    }

    #[inline]
    pub fn is_bot_owner(&self, user_id: UserId) -> bool {
        self.owner_ids.contains(&user_id.0)
    }

    /// Admin rights of `user_id` in `chat_id`, `None` for regular members.
    ///
    /// Lookups are cached per (chat, user), including negative answers.
    pub async fn get_admin_info(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<Option<AdminInfo>> {
        if self.is_bot_owner(user_id) {
            return Ok(Some(AdminInfo::full()));
        }

        let key = (chat_id.0, user_id.0);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let member = self.bot.get_chat_member(chat_id, user_id).await?;
        let info = AdminInfo::from_chat_member(&member);
        debug!("Fetched rights of {} in {}: {:?}", user_id, chat_id, info);
        self.cache.insert(key, info.clone());

        Ok(info)
    }

    /// Whether the user is the chat owner or an administrator.
    pub async fn is_admin(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<bool> {
        self.check(chat_id, user_id, |_| true).await
    }

    pub async fn can_delete_messages(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<bool> {
        self.check(chat_id, user_id, |admin| admin.can_delete_messages).await
    }

    pub async fn can_restrict_members(&self, chat_id: ChatId, user_id: UserId) -> anyhow::Result<bool> {
        self.check(chat_id, user_id, |admin| admin.can_restrict_members).await
    }

    /// Restricting needs the right on both the moderator and the bot.
    pub async fn can_ban(&self, chat_id: ChatId, moderator: UserId, bot_id: UserId) -> anyhow::Result<bool> {
        Ok(self.can_restrict_members(chat_id, moderator).await?
            && self.can_restrict_members(chat_id, bot_id).await?)
    }

    async fn check(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        right: impl FnOnce(&AdminInfo) -> bool,
    ) -> anyhow::Result<bool> {
        Ok(self
            .get_admin_info(chat_id, user_id)
            .await?
            .as_ref()
            .is_some_and(right))
    }

    /// Drop the cached entry, e.g. after a failed request hinted at stale rights.
    pub fn invalidate(&self, chat_id: ChatId, user_id: UserId) {
        self.cache.invalidate(&(chat_id.0, user_id.0));
        debug!("Invalidated admin cache for user {} in chat {}", user_id, chat_id);
    }
}
