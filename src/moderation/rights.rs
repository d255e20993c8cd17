//! Banned-rights flags and the permission dependency table.
//!
//! A set bit means the action is *restricted*. The table lookups here are
//! shared by the reducer, the entry builder and the submission planner.

use bitflags::bitflags;
use teloxide::types::ChatPermissions;

bitflags! {
    /// Restrictions applied to a group member.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BannedRights: u32 {
        /// Full ban: the user can no longer read the group.
        const VIEW_MESSAGES = 1 << 0;
        const SEND_TEXT = 1 << 1;
        /// Aggregate toggle over every media sub-right.
        const SEND_MEDIA = 1 << 2;
        const SEND_PHOTOS = 1 << 3;
        const SEND_VIDEOS = 1 << 4;
        /// Stickers and GIFs.
        const SEND_STICKERS = 1 << 5;
        const SEND_MUSIC = 1 << 6;
        const SEND_FILES = 1 << 7;
        const SEND_VOICE = 1 << 8;
        const SEND_VIDEO_NOTES = 1 << 9;
        const EMBED_LINKS = 1 << 10;
        const SEND_POLLS = 1 << 11;
        const ADD_MEMBERS = 1 << 12;
        const PIN_MESSAGES = 1 << 13;
        /// Only meaningful in forum groups.
        const MANAGE_TOPICS = 1 << 14;
        const CHANGE_INFO = 1 << 15;
    }
}

impl Default for BannedRights {
    fn default() -> Self {
        Self::empty()
    }
}

/// Media sub-rights in canonical display order.
pub const MEDIA_SUB_RIGHTS: [BannedRights; 9] = [
    BannedRights::SEND_PHOTOS,
    BannedRights::SEND_VIDEOS,
    BannedRights::SEND_STICKERS,
    BannedRights::SEND_MUSIC,
    BannedRights::SEND_FILES,
    BannedRights::SEND_VOICE,
    BannedRights::SEND_VIDEO_NOTES,
    BannedRights::EMBED_LINKS,
    BannedRights::SEND_POLLS,
];

/// Union of [`MEDIA_SUB_RIGHTS`].
pub const MEDIA_SUB_MASK: BannedRights = BannedRights::SEND_PHOTOS
    .union(BannedRights::SEND_VIDEOS)
    .union(BannedRights::SEND_STICKERS)
    .union(BannedRights::SEND_MUSIC)
    .union(BannedRights::SEND_FILES)
    .union(BannedRights::SEND_VOICE)
    .union(BannedRights::SEND_VIDEO_NOTES)
    .union(BannedRights::EMBED_LINKS)
    .union(BannedRights::SEND_POLLS);

/// Permission -> permissions that require it.
///
/// Restricting a key restricts its dependents; lifting a restriction on a
/// dependent lifts it on the key as well.
pub const DEPENDENCY_TABLE: [(BannedRights, BannedRights); 2] = [
    (BannedRights::SEND_MEDIA, MEDIA_SUB_MASK),
    (BannedRights::SEND_TEXT, BannedRights::EMBED_LINKS),
];

/// Bot API counterpart of every right that maps onto `ChatPermissions`.
const CHAT_PERMISSION_MAP: [(BannedRights, ChatPermissions); 14] = [
    (BannedRights::SEND_TEXT, ChatPermissions::SEND_MESSAGES),
    (BannedRights::SEND_PHOTOS, ChatPermissions::SEND_PHOTOS),
    (BannedRights::SEND_VIDEOS, ChatPermissions::SEND_VIDEOS),
    (BannedRights::SEND_STICKERS, ChatPermissions::SEND_OTHER_MESSAGES),
    (BannedRights::SEND_MUSIC, ChatPermissions::SEND_AUDIOS),
    (BannedRights::SEND_FILES, ChatPermissions::SEND_DOCUMENTS),
    (BannedRights::SEND_VOICE, ChatPermissions::SEND_VOICE_NOTES),
    (BannedRights::SEND_VIDEO_NOTES, ChatPermissions::SEND_VIDEO_NOTES),
    (BannedRights::EMBED_LINKS, ChatPermissions::ADD_WEB_PAGE_PREVIEWS),
    (BannedRights::SEND_POLLS, ChatPermissions::SEND_POLLS),
    (BannedRights::ADD_MEMBERS, ChatPermissions::INVITE_USERS),
    (BannedRights::PIN_MESSAGES, ChatPermissions::PIN_MESSAGES),
    (BannedRights::MANAGE_TOPICS, ChatPermissions::MANAGE_TOPICS),
    (BannedRights::CHANGE_INFO, ChatPermissions::CHANGE_INFO),
];

/// Rows of the permissions panel in canonical order.
pub fn panel_rights(is_forum: bool) -> Vec<BannedRights> {
    let mut rights = vec![
        BannedRights::SEND_TEXT,
        BannedRights::SEND_MEDIA,
        BannedRights::ADD_MEMBERS,
        BannedRights::PIN_MESSAGES,
    ];
    if is_forum {
        rights.push(BannedRights::MANAGE_TOPICS);
    }
    rights.push(BannedRights::CHANGE_INFO);
    rights
}

/// Every permission that requires one of the bits in `right`.
pub fn dependents(right: BannedRights) -> BannedRights {
    DEPENDENCY_TABLE
        .iter()
        .filter(|(key, _)| right.intersects(*key))
        .fold(BannedRights::empty(), |acc, (_, deps)| acc | *deps)
}

/// Every permission that one of the bits in `right` requires.
pub fn prerequisites(right: BannedRights) -> BannedRights {
    DEPENDENCY_TABLE
        .iter()
        .filter(|(_, deps)| deps.intersects(right))
        .fold(BannedRights::empty(), |acc, (key, _)| acc | *key)
}

/// Override set used before the moderator touches any toggle: the group
/// baseline plus text, media and every media sub-right.
pub fn initial_override(baseline: BannedRights) -> BannedRights {
    baseline | BannedRights::SEND_TEXT | BannedRights::SEND_MEDIA | MEDIA_SUB_MASK
}

impl BannedRights {
    /// Derive restrictions from a group's default (allowed) permissions.
    ///
    /// `SEND_MEDIA` counts as restricted only when every media sub-right is.
    pub fn from_chat_permissions(permissions: ChatPermissions) -> Self {
        let mut rights = CHAT_PERMISSION_MAP
            .iter()
            .filter(|(_, allowed)| !permissions.contains(*allowed))
            .fold(Self::empty(), |acc, (right, _)| acc | *right);

        if rights.contains(MEDIA_SUB_MASK) {
            rights |= Self::SEND_MEDIA;
        }
        rights
    }

    /// The allowed set sent with `restrictChatMember`.
    pub fn to_chat_permissions(self) -> ChatPermissions {
        CHAT_PERMISSION_MAP
            .iter()
            .filter(|(right, _)| !self.contains(*right))
            .fold(ChatPermissions::empty(), |acc, (_, allowed)| acc | *allowed)
    }

    /// Count of media sub-rights not restricted by `self`.
    pub fn permitted_media_count(self) -> usize {
        MEDIA_SUB_RIGHTS.iter().filter(|r| !self.contains(**r)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_dependents_cover_every_sub_right() {
        let deps = dependents(BannedRights::SEND_MEDIA);
        for right in MEDIA_SUB_RIGHTS {
            assert!(deps.contains(right));
        }
        assert!(!deps.contains(BannedRights::SEND_TEXT));
    }

    #[test]
    fn text_is_required_by_embed_links() {
        assert_eq!(dependents(BannedRights::SEND_TEXT), BannedRights::EMBED_LINKS);
        assert_eq!(
            prerequisites(BannedRights::EMBED_LINKS),
            BannedRights::SEND_TEXT | BannedRights::SEND_MEDIA
        );
    }

    #[test]
    fn structural_rights_have_no_dependencies() {
        for right in [
            BannedRights::ADD_MEMBERS,
            BannedRights::PIN_MESSAGES,
            BannedRights::MANAGE_TOPICS,
            BannedRights::CHANGE_INFO,
        ] {
            assert!(dependents(right).is_empty());
            assert!(prerequisites(right).is_empty());
        }
    }

    #[test]
    fn panel_hides_topics_outside_forums() {
        assert!(!panel_rights(false).contains(&BannedRights::MANAGE_TOPICS));
        let forum = panel_rights(true);
        assert_eq!(forum.len(), 6);
        assert_eq!(forum[4], BannedRights::MANAGE_TOPICS);
        assert_eq!(forum[5], BannedRights::CHANGE_INFO);
    }

    #[test]
    fn initial_override_keeps_baseline() {
        let baseline = BannedRights::PIN_MESSAGES;
        let initial = initial_override(baseline);
        assert!(initial.contains(BannedRights::PIN_MESSAGES));
        assert!(initial.contains(BannedRights::SEND_TEXT | BannedRights::SEND_MEDIA));
        assert!(initial.contains(MEDIA_SUB_MASK));
        assert!(!initial.contains(BannedRights::CHANGE_INFO));
    }

    #[test]
    fn chat_permissions_conversion() {
        let allowed = ChatPermissions::SEND_MESSAGES | ChatPermissions::SEND_PHOTOS;
        let rights = BannedRights::from_chat_permissions(allowed);
        assert!(!rights.contains(BannedRights::SEND_TEXT));
        assert!(!rights.contains(BannedRights::SEND_PHOTOS));
        assert!(rights.contains(BannedRights::SEND_VIDEOS));
        assert!(!rights.contains(BannedRights::SEND_MEDIA));
        assert_eq!(rights.to_chat_permissions(), allowed);
    }

    #[test]
    fn no_media_allowed_restricts_aggregate() {
        let rights = BannedRights::from_chat_permissions(ChatPermissions::SEND_MESSAGES);
        assert!(rights.contains(BannedRights::SEND_MEDIA));
        assert_eq!(rights.permitted_media_count(), 0);
        assert_eq!(BannedRights::empty().permitted_media_count(), MEDIA_SUB_RIGHTS.len());
    }
}
