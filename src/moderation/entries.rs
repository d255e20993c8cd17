//! Derivation of the ordered display entries from a form snapshot.
//!
//! `build_entries` is re-run on every state change; the bot layer turns its
//! output into message text and keyboard rows.

use teloxide::types::UserId;

use super::rights::{self, BannedRights, MEDIA_SUB_RIGHTS};
use super::state::{FormState, OptionId};

/// Facts about the group and the acting moderator that never change while
/// a dialog is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaticConfig {
    /// The moderator may restrict members.
    pub can_ban: bool,
    /// Group default restrictions, `None` when unknown.
    pub baseline: Option<BannedRights>,
    pub is_forum: bool,
}

/// Place of a row inside its visual group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Single,
    First,
    Inner,
    Last,
}

impl Position {
    fn in_list(index: usize, len: usize) -> Self {
        match (index, len) {
            (_, 1) => Self::Single,
            (0, _) => Self::First,
            (i, n) if i + 1 == n => Self::Last,
            _ => Self::Inner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Header { messages: usize },
    /// Title of the permissions panel. The copy is not fixed.
    PanelHeader { users: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRow {
    pub id: OptionId,
    /// Scope size, used to pluralise the label.
    pub users: usize,
    pub selected: bool,
    pub revealed: bool,
    /// The row can expand into per-user rows.
    pub expandable: bool,
    /// Number of selected users, shown only on expandable rows.
    pub badge: Option<usize>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRow {
    pub option: OptionId,
    pub user: UserId,
    pub name: String,
    pub selected: bool,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaCount {
    pub permitted: usize,
    pub total: usize,
    pub revealed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RightRow {
    pub right: BannedRights,
    /// Effective state: allowed by both the baseline and the override.
    pub enabled: bool,
    /// `false` when the baseline already restricts the right.
    pub interactive: bool,
    /// Present on the send-media row only.
    pub media: Option<MediaCount>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEntry {
    Section,
    Description(Description),
    Option(OptionRow),
    Peer(PeerRow),
    Right(RightRow),
    SubRight(RightRow),
    /// Link switching between full ban and partial restriction.
    BanModeLink { to_full: bool, plural: bool },
}

/// Build the ordered entry list for `state`. Pure and deterministic.
pub fn build_entries(state: &FormState, config: &StaticConfig) -> Vec<DisplayEntry> {
    let scope = &state.scope;
    let users = scope.user_count();
    let multi_user = users > 1;

    let mut entries = vec![
        DisplayEntry::Section,
        DisplayEntry::Description(Description::Header {
            messages: scope.messages().len(),
        }),
    ];

    let mut options = vec![
        option_row(state, OptionId::Report, false, Position::First),
        option_row(
            state,
            OptionId::DeleteAll,
            multi_user,
            if config.can_ban {
                Position::Inner
            } else {
                Position::Last
            },
        ),
    ];
    if config.can_ban {
        let position = if !state.ban.revealed || !multi_user {
            Position::Last
        } else {
            Position::Inner
        };
        options.push(option_row(state, OptionId::Ban, multi_user, position));
    }

    let peers = scope.resolve_peers();
    let option_count = options.len();
    for (index, row) in options.into_iter().enumerate() {
        let show_peers = row.expandable && row.revealed && !peers.is_empty();
        let option = row.id;
        entries.push(DisplayEntry::Option(row));

        if show_peers {
            let selection = &state.option(option).users;
            for (peer_index, author) in peers.iter().enumerate() {
                let is_last = index + 1 == option_count && peer_index + 1 == peers.len();
                entries.push(DisplayEntry::Peer(PeerRow {
                    option,
                    user: author.id,
                    name: author.name.clone(),
                    selected: selection.contains(&author.id),
                    position: if is_last { Position::Last } else { Position::Inner },
                }));
            }
        }
    }

    if config.can_ban && config.baseline.is_some() {
        if !state.ban_fully {
            entries.push(DisplayEntry::Section);
            entries.push(DisplayEntry::Description(Description::PanelHeader { users }));
            push_permission_rows(state, config, &mut entries);
        }

        entries.push(DisplayEntry::BanModeLink {
            to_full: !state.ban_fully,
            plural: users != 1,
        });
    }

    entries.push(DisplayEntry::Section);
    entries
}

fn option_row(state: &FormState, id: OptionId, expandable: bool, position: Position) -> OptionRow {
    let option = state.option(id);
    OptionRow {
        id,
        users: state.scope.user_count(),
        selected: option.selected,
        revealed: option.revealed,
        expandable,
        badge: (expandable && !option.users.is_empty()).then_some(option.users.len()),
        position,
    }
}

fn right_row(state: &FormState, right: BannedRights, position: Position) -> RightRow {
    RightRow {
        right,
        enabled: state.is_right_enabled(right),
        interactive: !state.baseline_rights().contains(right),
        media: None,
        position,
    }
}

fn push_permission_rows(state: &FormState, config: &StaticConfig, entries: &mut Vec<DisplayEntry>) {
    let list = rights::panel_rights(config.is_forum);
    let restricted = state.baseline_rights() | state.effective_override();

    for (index, right) in list.iter().copied().enumerate() {
        let mut row = right_row(state, right, Position::in_list(index, list.len()));

        if right == BannedRights::SEND_MEDIA {
            row.media = Some(MediaCount {
                permitted: restricted.permitted_media_count(),
                total: MEDIA_SUB_RIGHTS.len(),
                revealed: state.media_revealed,
            });
            entries.push(DisplayEntry::Right(row));

            if state.media_revealed {
                for sub in MEDIA_SUB_RIGHTS {
                    entries.push(DisplayEntry::SubRight(right_row(state, sub, Position::Inner)));
                }
            }
        } else {
            entries.push(DisplayEntry::Right(row));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use teloxide::types::ChatId;

    use super::*;
    use crate::moderation::scope::tests::message;
    use crate::moderation::scope::TargetScope;
    use crate::moderation::state::{reduce, Action};

    fn state_with(users: &[(u64, &str)], baseline: BannedRights) -> FormState {
        let messages = users
            .iter()
            .enumerate()
            .map(|(i, (id, name))| message(i as i32 + 1, *id, name))
            .collect();
        let scope = TargetScope::new(ChatId(-1002), messages, &[]);
        FormState::new(Arc::new(scope), Some(baseline))
    }

    fn config(baseline: BannedRights) -> StaticConfig {
        StaticConfig {
            can_ban: true,
            baseline: Some(baseline),
            is_forum: false,
        }
    }

    fn option<'a>(entries: &'a [DisplayEntry], id: OptionId) -> Option<&'a OptionRow> {
        entries.iter().find_map(|e| match e {
            DisplayEntry::Option(row) if row.id == id => Some(row),
            _ => None,
        })
    }

    fn peers(entries: &[DisplayEntry]) -> Vec<&PeerRow> {
        entries
            .iter()
            .filter_map(|e| match e {
                DisplayEntry::Peer(row) => Some(row),
                _ => None,
            })
            .collect()
    }

    fn right<'a>(entries: &'a [DisplayEntry], right: BannedRights) -> Option<&'a RightRow> {
        entries.iter().find_map(|e| match e {
            DisplayEntry::Right(row) if row.right == right => Some(row),
            _ => None,
        })
    }

    #[test]
    fn building_is_deterministic() {
        let state = state_with(&[(1, "A"), (2, "B")], BannedRights::empty());
        let state = reduce(&state, &Action::ToggleReveal(OptionId::Ban));
        let config = config(BannedRights::empty());
        assert_eq!(build_entries(&state, &config), build_entries(&state, &config));
    }

    #[test]
    fn skeleton_order() {
        let state = state_with(&[(1, "A")], BannedRights::empty());
        let entries = build_entries(&state, &config(BannedRights::empty()));

        assert_eq!(entries[0], DisplayEntry::Section);
        assert_eq!(
            entries[1],
            DisplayEntry::Description(Description::Header { messages: 1 })
        );
        assert!(matches!(&entries[2], DisplayEntry::Option(r) if r.id == OptionId::Report));
        assert!(matches!(&entries[3], DisplayEntry::Option(r) if r.id == OptionId::DeleteAll));
        assert!(matches!(&entries[4], DisplayEntry::Option(r) if r.id == OptionId::Ban));
        assert_eq!(
            entries[5],
            DisplayEntry::BanModeLink {
                to_full: false,
                plural: false
            }
        );
        assert_eq!(entries.last(), Some(&DisplayEntry::Section));
    }

    #[test]
    fn ban_row_hidden_without_permission() {
        let state = state_with(&[(1, "A"), (2, "B")], BannedRights::empty());
        let config = StaticConfig {
            can_ban: false,
            ..config(BannedRights::empty())
        };
        let entries = build_entries(&state, &config);
        assert!(option(&entries, OptionId::Ban).is_none());
        assert_eq!(
            option(&entries, OptionId::DeleteAll).map(|r| r.position),
            Some(Position::Last)
        );
        assert!(!entries
            .iter()
            .any(|e| matches!(e, DisplayEntry::BanModeLink { .. })));
    }

    #[test]
    fn single_user_delete_all_has_no_sub_rows_or_badge() {
        let state = state_with(&[(1, "A")], BannedRights::empty());
        let state = reduce(&state, &Action::ToggleSelected(OptionId::DeleteAll));
        let state = reduce(&state, &Action::ToggleReveal(OptionId::DeleteAll));
        let entries = build_entries(&state, &config(BannedRights::empty()));

        let row = option(&entries, OptionId::DeleteAll).expect("delete row");
        assert!(row.selected);
        assert!(!row.expandable);
        assert_eq!(row.badge, None);
        assert!(peers(&entries).is_empty());
    }

    #[test]
    fn revealed_ban_with_one_peer_selected() {
        let state = state_with(&[(1, "A"), (2, "B")], BannedRights::empty());
        let state = reduce(&state, &Action::ToggleReveal(OptionId::Ban));
        let state = reduce(
            &state,
            &Action::TogglePeerSelected {
                user: UserId(2),
                option: OptionId::Ban,
            },
        );
        let entries = build_entries(&state, &config(BannedRights::empty()));

        let row = option(&entries, OptionId::Ban).expect("ban row");
        assert!(row.selected);
        assert_eq!(row.badge, Some(1));
        assert_eq!(row.position, Position::Inner);

        let peer_rows = peers(&entries);
        assert_eq!(peer_rows.len(), 2);
        let selected: Vec<_> = peer_rows.iter().filter(|p| p.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].user, UserId(2));
        assert_eq!(selected[0].name, "B");
        assert_eq!(peer_rows[1].position, Position::Last);
    }

    #[test]
    fn report_never_expands() {
        let state = state_with(&[(1, "A"), (2, "B")], BannedRights::empty());
        let state = reduce(&state, &Action::ToggleSelected(OptionId::Report));
        let state = reduce(&state, &Action::ToggleReveal(OptionId::Report));
        let entries = build_entries(&state, &config(BannedRights::empty()));

        let row = option(&entries, OptionId::Report).expect("report row");
        assert!(!row.expandable);
        assert_eq!(row.badge, None);
        assert!(peers(&entries).is_empty());
    }

    #[test]
    fn panel_appears_only_for_partial_restriction() {
        let state = state_with(&[(1, "A"), (2, "B")], BannedRights::empty());
        let entries = build_entries(&state, &config(BannedRights::empty()));
        assert!(right(&entries, BannedRights::SEND_TEXT).is_none());

        let state = reduce(&state, &Action::SetBanMode { full: false });
        let entries = build_entries(&state, &config(BannedRights::empty()));
        assert!(entries.contains(&DisplayEntry::Description(Description::PanelHeader {
            users: 2
        })));
        assert!(right(&entries, BannedRights::CHANGE_INFO).is_some());
        assert!(right(&entries, BannedRights::MANAGE_TOPICS).is_none());
        assert!(entries.contains(&DisplayEntry::BanModeLink {
            to_full: true,
            plural: true
        }));
    }

    #[test]
    fn panel_skipped_when_baseline_unknown() {
        let state = state_with(&[(1, "A")], BannedRights::empty());
        let state = reduce(&state, &Action::SetBanMode { full: false });
        let config = StaticConfig {
            can_ban: true,
            baseline: None,
            is_forum: false,
        };
        let entries = build_entries(&state, &config);
        assert!(right(&entries, BannedRights::SEND_TEXT).is_none());
        assert!(!entries
            .iter()
            .any(|e| matches!(e, DisplayEntry::BanModeLink { .. })));
    }

    #[test]
    fn restricting_media_zeroes_the_sub_count() {
        let state = state_with(&[(1, "A")], BannedRights::empty());
        let state = reduce(&state, &Action::SetBanMode { full: false });
        // Lift the default text and media restrictions first.
        let state = reduce(
            &state,
            &Action::ToggleRight {
                right: BannedRights::SEND_MEDIA,
                enable: true,
            },
        );
        let entries = build_entries(&state, &config(BannedRights::empty()));
        let media = right(&entries, BannedRights::SEND_MEDIA).expect("media row");
        assert!(media.enabled);
        assert_eq!(media.media.map(|m| m.permitted), Some(MEDIA_SUB_RIGHTS.len()));

        let state = reduce(
            &state,
            &Action::ToggleRight {
                right: BannedRights::SEND_MEDIA,
                enable: false,
            },
        );
        let entries = build_entries(&state, &config(BannedRights::empty()));
        let media = right(&entries, BannedRights::SEND_MEDIA).expect("media row");
        assert!(!media.enabled);
        assert_eq!(
            media.media,
            Some(MediaCount {
                permitted: 0,
                total: MEDIA_SUB_RIGHTS.len(),
                revealed: false
            })
        );
    }

    #[test]
    fn baseline_restrictions_are_never_interactive() {
        let baseline = BannedRights::PIN_MESSAGES | BannedRights::SEND_POLLS;
        let state = state_with(&[(1, "A")], baseline);
        let state = reduce(&state, &Action::SetBanMode { full: false });
        let state = reduce(&state, &Action::ToggleMediaRevealed);
        let state = reduce(
            &state,
            &Action::ToggleRight {
                right: BannedRights::PIN_MESSAGES,
                enable: true,
            },
        );
        let entries = build_entries(&state, &config(baseline));

        let pin = right(&entries, BannedRights::PIN_MESSAGES).expect("pin row");
        assert!(!pin.enabled);
        assert!(!pin.interactive);

        let polls = entries
            .iter()
            .find_map(|e| match e {
                DisplayEntry::SubRight(row) if row.right == BannedRights::SEND_POLLS => Some(row),
                _ => None,
            })
            .expect("polls row");
        assert!(!polls.enabled);
        assert!(!polls.interactive);

        let subs = entries
            .iter()
            .filter(|e| matches!(e, DisplayEntry::SubRight(_)))
            .count();
        assert_eq!(subs, MEDIA_SUB_RIGHTS.len());
    }

    #[test]
    fn permission_rows_follow_canonical_order() {
        let state = state_with(&[(1, "A")], BannedRights::empty());
        let state = reduce(&state, &Action::SetBanMode { full: false });
        let config = StaticConfig {
            is_forum: true,
            ..config(BannedRights::empty())
        };
        let rows: Vec<_> = build_entries(&state, &config)
            .into_iter()
            .filter_map(|e| match e {
                DisplayEntry::Right(row) => Some((row.right, row.position)),
                _ => None,
            })
            .collect();
        assert_eq!(
            rows,
            vec![
                (BannedRights::SEND_TEXT, Position::First),
                (BannedRights::SEND_MEDIA, Position::Inner),
                (BannedRights::ADD_MEMBERS, Position::Inner),
                (BannedRights::PIN_MESSAGES, Position::Inner),
                (BannedRights::MANAGE_TOPICS, Position::Inner),
                (BannedRights::CHANGE_INFO, Position::Last),
            ]
        );
    }
}
