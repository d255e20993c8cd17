//! Translation of the final form snapshot into backend requests.

use teloxide::types::{ChatId, MessageId, UserId};

use super::entries::StaticConfig;
use super::rights::{self, BannedRights, MEDIA_SUB_RIGHTS};
use super::state::{FormState, OptionState};

/// `until_date` meaning "never lifted".
pub const UNTIL_FOREVER: i32 = i32::MAX;

/// A backend operation produced by a confirmed dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Delete the selected messages; `revoke` deletes them for everyone.
    DeleteMessages {
        chat: ChatId,
        ids: Vec<MessageId>,
        revoke: bool,
    },
    UpdateBannedRights {
        chat: ChatId,
        user: UserId,
        rights: BannedRights,
        until: i32,
    },
    ReportSpam {
        chat: ChatId,
        ids: Vec<MessageId>,
    },
    ClearUserHistory {
        chat: ChatId,
        user: UserId,
    },
}

/// Restrictions applied to banned users in the final snapshot.
pub fn effective_ban_rights(state: &FormState, config: &StaticConfig) -> BannedRights {
    if state.ban_fully || state.baseline.is_none() {
        return BannedRights::VIEW_MESSAGES;
    }

    rights::panel_rights(config.is_forum)
        .into_iter()
        .chain(MEDIA_SUB_RIGHTS)
        .filter(|right| !state.is_right_enabled(*right))
        .fold(BannedRights::empty(), |acc, right| acc | right)
}

/// Users of `option` in scope order.
fn selected_users<'a>(state: &'a FormState, option: &'a OptionState) -> impl Iterator<Item = UserId> + 'a {
    state
        .scope
        .users()
        .iter()
        .copied()
        .filter(|user| option.users.contains(user))
}

/// Requests for a confirmed dialog, in execution order.
pub fn plan_submission(state: &FormState, config: &StaticConfig) -> Vec<Request> {
    let chat = state.scope.chat_id;
    let ids = state.scope.message_ids();

    let mut requests = vec![Request::DeleteMessages {
        chat,
        ids: ids.clone(),
        revoke: true,
    }];

    if state.ban.selected {
        let rights = effective_ban_rights(state, config);
        requests.extend(selected_users(state, &state.ban).map(|user| {
            Request::UpdateBannedRights {
                chat,
                user,
                rights,
                until: UNTIL_FOREVER,
            }
        }));
    }

    if state.report.selected {
        requests.push(Request::ReportSpam { chat, ids });
    }

    if state.delete_all.selected {
        requests.extend(
            selected_users(state, &state.delete_all).map(|user| Request::ClearUserHistory { chat, user }),
        );
    }

    requests
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::moderation::scope::tests::message;
    use crate::moderation::scope::TargetScope;
    use crate::moderation::state::{reduce, Action, OptionId};

    fn state(users: &[u64]) -> FormState {
        let messages = users
            .iter()
            .enumerate()
            .map(|(i, id)| message(100 + i as i32, *id, "user"))
            .collect();
        let scope = TargetScope::new(ChatId(-1003), messages, &[]);
        FormState::new(Arc::new(scope), Some(BannedRights::empty()))
    }

    fn config() -> StaticConfig {
        StaticConfig {
            can_ban: true,
            baseline: Some(BannedRights::empty()),
            is_forum: false,
        }
    }

    #[test]
    fn delete_is_always_first_and_alone_by_default() {
        let requests = plan_submission(&state(&[1, 2]), &config());
        assert_eq!(
            requests,
            vec![Request::DeleteMessages {
                chat: ChatId(-1003),
                ids: vec![MessageId(100), MessageId(101)],
                revoke: true,
            }]
        );
    }

    #[test]
    fn full_ban_for_single_user() {
        let state = reduce(&state(&[1]), &Action::ToggleSelected(OptionId::Ban));
        let requests = plan_submission(&state, &config());

        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1],
            Request::UpdateBannedRights {
                chat: ChatId(-1003),
                user: UserId(1),
                rights: BannedRights::VIEW_MESSAGES,
                until: UNTIL_FOREVER,
            }
        );
    }

    #[test]
    fn requests_follow_the_fixed_order() {
        let mut s = state(&[1, 2]);
        for action in [
            Action::ToggleSelected(OptionId::DeleteAll),
            Action::ToggleSelected(OptionId::Report),
            Action::ToggleSelected(OptionId::Ban),
            Action::TogglePeerSelected {
                user: UserId(1),
                option: OptionId::Ban,
            },
        ] {
            s = reduce(&s, &action);
        }

        let kinds: Vec<&str> = plan_submission(&s, &config())
            .iter()
            .map(|r| match r {
                Request::DeleteMessages { .. } => "delete",
                Request::UpdateBannedRights { .. } => "ban",
                Request::ReportSpam { .. } => "report",
                Request::ClearUserHistory { .. } => "clear",
            })
            .collect();
        assert_eq!(kinds, vec!["delete", "ban", "report", "clear", "clear"]);
    }

    #[test]
    fn partial_restriction_uses_baseline_and_override() {
        let mut s = state(&[1]);
        s.baseline = Some(BannedRights::CHANGE_INFO);
        for action in [
            Action::ToggleSelected(OptionId::Ban),
            Action::SetBanMode { full: false },
            Action::ToggleRight {
                right: BannedRights::SEND_TEXT,
                enable: true,
            },
        ] {
            s = reduce(&s, &action);
        }

        let config = StaticConfig {
            baseline: Some(BannedRights::CHANGE_INFO),
            ..config()
        };
        let rights = effective_ban_rights(&s, &config);
        assert!(!rights.contains(BannedRights::VIEW_MESSAGES));
        assert!(!rights.contains(BannedRights::SEND_TEXT));
        assert!(!rights.contains(BannedRights::EMBED_LINKS));
        assert!(rights.contains(BannedRights::CHANGE_INFO));
        assert!(rights.contains(BannedRights::SEND_MEDIA | BannedRights::SEND_PHOTOS));
        assert!(!rights.contains(BannedRights::PIN_MESSAGES));

        match &plan_submission(&s, &config)[1] {
            Request::UpdateBannedRights { rights: planned, until, .. } => {
                assert_eq!(*planned, rights);
                assert_eq!(*until, UNTIL_FOREVER);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn deselected_users_are_skipped() {
        let mut s = reduce(&state(&[1, 2, 3]), &Action::ToggleSelected(OptionId::DeleteAll));
        s = reduce(
            &s,
            &Action::TogglePeerSelected {
                user: UserId(2),
                option: OptionId::DeleteAll,
            },
        );
        let users: Vec<UserId> = plan_submission(&s, &config())
            .into_iter()
            .filter_map(|r| match r {
                Request::ClearUserHistory { user, .. } => Some(user),
                _ => None,
            })
            .collect();
        assert_eq!(users, vec![UserId(1), UserId(3)]);
    }
}
