//! Turns display entries into message text and inline keyboard rows.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::moderation::callback::encode;
use crate::moderation::{
    Action, BannedRights, Description, DialogCommand, DisplayEntry, OptionId, OptionRow, PeerRow,
    Position, Request, RightRow,
};

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("1 {}", one)
    } else {
        format!("{} {}", count, many)
    }
}

fn check(selected: bool) -> &'static str {
    if selected { "☑️" } else { "⬜" }
}

fn branch(position: Position) -> &'static str {
    match position {
        Position::Single | Position::Last => "└",
        Position::First | Position::Inner => "├",
    }
}

/// Button label of a right.
pub fn right_label(right: BannedRights) -> &'static str {
    match right {
        r if r == BannedRights::SEND_TEXT => "Send Messages",
        r if r == BannedRights::SEND_MEDIA => "Send Media",
        r if r == BannedRights::SEND_PHOTOS => "Photos",
        r if r == BannedRights::SEND_VIDEOS => "Videos",
        r if r == BannedRights::SEND_STICKERS => "Stickers & GIFs",
        r if r == BannedRights::SEND_MUSIC => "Music",
        r if r == BannedRights::SEND_FILES => "Files",
        r if r == BannedRights::SEND_VOICE => "Voice Messages",
        r if r == BannedRights::SEND_VIDEO_NOTES => "Video Messages",
        r if r == BannedRights::EMBED_LINKS => "Embed Links",
        r if r == BannedRights::SEND_POLLS => "Polls",
        r if r == BannedRights::ADD_MEMBERS => "Add Members",
        r if r == BannedRights::PIN_MESSAGES => "Pin Messages",
        r if r == BannedRights::MANAGE_TOPICS => "Manage Topics",
        r if r == BannedRights::CHANGE_INFO => "Change Chat Info",
        _ => "Unknown",
    }
}

fn option_title(row: &OptionRow, ban_fully: bool) -> &'static str {
    let many = row.users != 1;
    match (row.id, ban_fully) {
        (OptionId::Report, _) => "Report Spam",
        (OptionId::DeleteAll, _) if many => "Delete All from Users",
        (OptionId::DeleteAll, _) => "Delete All from User",
        (OptionId::Ban, true) if many => "Ban Users",
        (OptionId::Ban, true) => "Ban User",
        (OptionId::Ban, false) if many => "Restrict Users",
        (OptionId::Ban, false) => "Restrict User",
    }
}

/// Per-user options with every author exempt have nobody to act on.
fn option_inert(row: &OptionRow) -> bool {
    row.id != OptionId::Report && row.users == 0
}

fn option_label(row: &OptionRow, ban_fully: bool) -> String {
    let title = option_title(row, ban_fully);
    if option_inert(row) {
        return format!("🔒 {}", title);
    }

    match row.badge {
        Some(count) => format!("{} {} ({}/{})", check(row.selected), title, count, row.users),
        None => format!("{} {}", check(row.selected), title),
    }
}

/// HTML text above the keyboard.
pub fn render_text(entries: &[DisplayEntry]) -> String {
    let mut lines = Vec::new();

    for entry in entries {
        match entry {
            DisplayEntry::Description(Description::Header { messages }) => {
                lines.push(format!(
                    "🧹 <b>Delete {}?</b>",
                    plural(*messages, "message", "messages")
                ));
            }
            DisplayEntry::Description(Description::PanelHeader { users }) => {
                let who = if *users == 1 {
                    "this user".to_string()
                } else {
                    format!("these {} users", users)
                };
                lines.push(String::new());
                lines.push(format!("<b>What can {} do?</b>", who));
            }
            _ => {}
        }
    }

    lines.push(String::new());
    lines.push("<i>Pick the extra actions, then press Delete.</i>".to_string());
    lines.join("\n")
}

fn button(dialog: u64, label: impl Into<String>, command: DialogCommand) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, encode(dialog, &command))
}

fn option_buttons(dialog: u64, row: &OptionRow, ban_fully: bool) -> Vec<InlineKeyboardButton> {
    let command = if option_inert(row) {
        DialogCommand::Noop
    } else {
        DialogCommand::Apply(Action::ToggleSelected(row.id))
    };
    let mut buttons = vec![button(dialog, option_label(row, ban_fully), command)];
    if row.expandable {
        buttons.push(button(
            dialog,
            if row.revealed { "▴" } else { "▾" },
            DialogCommand::Apply(Action::ToggleReveal(row.id)),
        ));
    }
    buttons
}

fn peer_button(dialog: u64, row: &PeerRow) -> InlineKeyboardButton {
    button(
        dialog,
        format!("{} {} {}", branch(row.position), check(row.selected), row.name),
        DialogCommand::Apply(Action::TogglePeerSelected {
            user: row.user,
            option: row.option,
        }),
    )
}

fn right_buttons(dialog: u64, row: &RightRow, nested: bool) -> Vec<InlineKeyboardButton> {
    let mark = if !row.interactive {
        "🔒"
    } else if row.enabled {
        "✅"
    } else {
        "🚫"
    };
    let mut label = format!("{} {}", mark, right_label(row.right));
    if nested {
        label = format!("{} {}", branch(row.position), label);
    }
    if let Some(media) = row.media {
        label = format!("{} {}/{}", label, media.permitted, media.total);
    }

    let command = if row.interactive {
        DialogCommand::Apply(Action::ToggleRight {
            right: row.right,
            enable: !row.enabled,
        })
    } else {
        DialogCommand::Noop
    };

    let mut buttons = vec![button(dialog, label, command)];
    if let Some(media) = row.media {
        buttons.push(button(
            dialog,
            if media.revealed { "▴" } else { "▾" },
            DialogCommand::Apply(Action::ToggleMediaRevealed),
        ));
    }
    buttons
}

/// Keyboard for `entries`, ending with the cancel and confirm buttons.
pub fn render_keyboard(dialog: u64, entries: &[DisplayEntry], ban_fully: bool) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();

    for entry in entries {
        match entry {
            DisplayEntry::Section | DisplayEntry::Description(_) => {}
            DisplayEntry::Option(row) => rows.push(option_buttons(dialog, row, ban_fully)),
            DisplayEntry::Peer(row) => rows.push(vec![peer_button(dialog, row)]),
            DisplayEntry::Right(row) => rows.push(right_buttons(dialog, row, false)),
            DisplayEntry::SubRight(row) => rows.push(right_buttons(dialog, row, true)),
            DisplayEntry::BanModeLink { to_full, plural } => {
                let label = match (to_full, plural) {
                    (true, true) => "⛔ Ban users fully instead",
                    (true, false) => "⛔ Ban user fully instead",
                    (false, true) => "⚙️ Restrict users partially",
                    (false, false) => "⚙️ Restrict user partially",
                };
                rows.push(vec![button(
                    dialog,
                    label,
                    DialogCommand::Apply(Action::SetBanMode { full: *to_full }),
                )]);
            }
        }
    }

    rows.push(vec![
        button(dialog, "✖️ Cancel", DialogCommand::Cancel),
        button(dialog, "🗑 Delete", DialogCommand::Confirm),
    ]);

    InlineKeyboardMarkup::new(rows)
}

/// Summary shown once a dialog has been submitted.
pub fn render_summary(requests: &[Request]) -> String {
    let mut lines = Vec::new();

    for request in requests {
        match request {
            Request::DeleteMessages { ids, .. } => {
                lines.push(format!("🗑 Deleting {}.", plural(ids.len(), "message", "messages")));
            }
            Request::ReportSpam { ids, .. } => {
                lines.push(format!("🚩 Reported {} as spam.", plural(ids.len(), "message", "messages")));
            }
            _ => {}
        }
    }

    let bans: Vec<&BannedRights> = requests
        .iter()
        .filter_map(|r| match r {
            Request::UpdateBannedRights { rights, .. } => Some(rights),
            _ => None,
        })
        .collect();
    if let Some(rights) = bans.first() {
        let verb = if rights.contains(BannedRights::VIEW_MESSAGES) {
            "Banning"
        } else {
            "Restricting"
        };
        lines.push(format!("⛔ {} {}.", verb, plural(bans.len(), "user", "users")));
    }

    let clears = requests
        .iter()
        .filter(|r| matches!(r, Request::ClearUserHistory { .. }))
        .count();
    if clears > 0 {
        lines.push(format!(
            "🧹 Clearing recent messages of {}.",
            plural(clears, "user", "users")
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use teloxide::types::{ChatId, InlineKeyboardButtonKind, MessageId, UserId};

    use super::*;
    use crate::moderation::entries::build_entries;
    use crate::moderation::scope::tests::message;
    use crate::moderation::state::{reduce, FormState};
    use crate::moderation::{StaticConfig, TargetScope, UNTIL_FOREVER};

    fn state(users: &[u64]) -> FormState {
        let messages = users
            .iter()
            .enumerate()
            .map(|(i, id)| message(i as i32 + 1, *id, &format!("User {}", id)))
            .collect();
        FormState::new(
            Arc::new(TargetScope::new(ChatId(-1), messages, &[])),
            Some(BannedRights::empty()),
        )
    }

    fn config() -> StaticConfig {
        StaticConfig {
            can_ban: true,
            baseline: Some(BannedRights::empty()),
            is_forum: false,
        }
    }

    fn labels(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| b.text.clone())
            .collect()
    }

    fn callback_data(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn single_user_dialog() {
        let s = state(&[7]);
        let entries = build_entries(&s, &config());

        let text = render_text(&entries);
        assert!(text.contains("Delete 1 message?"));

        let markup = render_keyboard(42, &entries, s.ban_fully);
        assert_eq!(
            labels(&markup),
            vec![
                "⬜ Report Spam",
                "⬜ Delete All from User",
                "⬜ Ban User",
                "⚙️ Restrict user partially",
                "✖️ Cancel",
                "🗑 Delete",
            ]
        );
    }

    #[test]
    fn every_button_fits_callback_limit() {
        let mut s = state(&[u64::MAX, 2, 3]);
        for action in [
            Action::ToggleSelected(OptionId::Ban),
            Action::ToggleReveal(OptionId::Ban),
            Action::SetBanMode { full: false },
            Action::ToggleMediaRevealed,
        ] {
            s = reduce(&s, &action);
        }
        let entries = build_entries(&s, &config());
        let markup = render_keyboard(u64::MAX, &entries, s.ban_fully);

        let data = callback_data(&markup);
        assert!(!data.is_empty());
        assert!(data.iter().all(|d| d.len() <= 64));
        assert!(labels(&markup).iter().any(|l| l.contains("🚫 Send Media 0/9")));
        assert!(render_text(&entries).contains("What can these 3 users do?"));
    }

    #[test]
    fn expandable_row_gets_reveal_button() {
        let s = reduce(&state(&[1, 2]), &Action::ToggleSelected(OptionId::DeleteAll));
        let markup = render_keyboard(1, &build_entries(&s, &config()), s.ban_fully);
        assert_eq!(markup.inline_keyboard[1].len(), 2);
        assert_eq!(markup.inline_keyboard[1][0].text, "☑️ Delete All from Users (2/2)");
    }

    #[test]
    fn delete_all_is_inert_when_every_author_is_exempt() {
        let scope = TargetScope::new(
            ChatId(-1),
            vec![message(1, 1, "Admin"), message(2, 2, "Moderator")],
            &[UserId(1), UserId(2)],
        );
        let s = FormState::new(Arc::new(scope), Some(BannedRights::empty()));
        let config = StaticConfig {
            can_ban: false,
            ..config()
        };
        let markup = render_keyboard(9, &build_entries(&s, &config), s.ban_fully);

        assert_eq!(
            labels(&markup),
            vec!["⬜ Report Spam", "🔒 Delete All from Users", "✖️ Cancel", "🗑 Delete"]
        );
        assert_eq!(callback_data(&markup)[1], encode(9, &DialogCommand::Noop));
    }

    #[test]
    fn summary_lists_planned_work() {
        let requests = vec![
            Request::DeleteMessages {
                chat: ChatId(-1),
                ids: vec![MessageId(1), MessageId(2)],
                revoke: true,
            },
            Request::UpdateBannedRights {
                chat: ChatId(-1),
                user: UserId(5),
                rights: BannedRights::VIEW_MESSAGES,
                until: UNTIL_FOREVER,
            },
            Request::ClearUserHistory {
                chat: ChatId(-1),
                user: UserId(5),
            },
        ];
        assert_eq!(
            render_summary(&requests),
            "🗑 Deleting 2 messages.\n⛔ Banning 1 user.\n🧹 Clearing recent messages of 1 user."
        );
    }
}
