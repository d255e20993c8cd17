//! Form state snapshots and the reducer that advances them.

use std::collections::BTreeSet;
use std::sync::Arc;

use teloxide::types::UserId;

use super::rights::{self, BannedRights};
use super::scope::TargetScope;

/// The three actions a moderator can opt into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionId {
    Report,
    DeleteAll,
    Ban,
}

/// Selection state of a single option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionState {
    pub selected: bool,
    pub revealed: bool,
    /// Always a subset of the scope's users.
    pub users: BTreeSet<UserId>,
}

/// An immutable snapshot of the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub scope: Arc<TargetScope>,
    pub report: OptionState,
    pub delete_all: OptionState,
    pub ban: OptionState,
    /// Full ban rather than a partial restriction.
    pub ban_fully: bool,
    pub media_revealed: bool,
    /// Restrictions picked in the permissions panel, if any were touched.
    pub override_rights: Option<BannedRights>,
    /// Group default restrictions, `None` when they couldn't be fetched.
    pub baseline: Option<BannedRights>,
}

/// A discrete user interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetBanMode { full: bool },
    /// Switch `right` to `enable`d (lift the restriction) or restricted.
    ToggleRight { right: BannedRights, enable: bool },
    ToggleMediaRevealed,
    ToggleReveal(OptionId),
    ToggleSelected(OptionId),
    TogglePeerSelected { user: UserId, option: OptionId },
}

impl FormState {
    pub fn new(scope: Arc<TargetScope>, baseline: Option<BannedRights>) -> Self {
        Self {
            scope,
            report: OptionState::default(),
            delete_all: OptionState::default(),
            ban: OptionState::default(),
            ban_fully: true,
            media_revealed: false,
            override_rights: None,
            baseline,
        }
    }

    pub fn option(&self, id: OptionId) -> &OptionState {
        match id {
            OptionId::Report => &self.report,
            OptionId::DeleteAll => &self.delete_all,
            OptionId::Ban => &self.ban,
        }
    }

    fn option_mut(&mut self, id: OptionId) -> &mut OptionState {
        match id {
            OptionId::Report => &mut self.report,
            OptionId::DeleteAll => &mut self.delete_all,
            OptionId::Ban => &mut self.ban,
        }
    }

    /// Known group defaults, empty when unknown.
    pub fn baseline_rights(&self) -> BannedRights {
        self.baseline.unwrap_or_default()
    }

    /// The override set currently in effect.
    pub fn effective_override(&self) -> BannedRights {
        self.override_rights
            .unwrap_or_else(|| rights::initial_override(self.baseline_rights()))
    }

    /// Whether `right` is allowed under the baseline and the override.
    pub fn is_right_enabled(&self, right: BannedRights) -> bool {
        !self.baseline_rights().contains(right) && !self.effective_override().contains(right)
    }
}

/// Produce the snapshot that follows `state` after `action`.
///
/// Never fails and never touches `state`.
pub fn reduce(state: &FormState, action: &Action) -> FormState {
    let mut next = state.clone();

    match *action {
        // Without group defaults there is nothing to restrict against.
        Action::SetBanMode { full: false } | Action::ToggleRight { .. } if state.baseline.is_none() => {}
        Action::SetBanMode { full } => {
            next.ban_fully = full;
        }
        Action::ToggleRight { right, enable } => {
            let mut flags = state.effective_override();
            if enable {
                flags.remove(right | rights::dependents(right) | rights::prerequisites(right));
            } else {
                flags.insert(right | rights::dependents(right));
            }
            next.override_rights = Some(flags);
        }
        Action::ToggleMediaRevealed => {
            next.media_revealed = !next.media_revealed;
        }
        Action::ToggleReveal(id) => {
            let option = next.option_mut(id);
            option.revealed = !option.revealed;
        }
        Action::ToggleSelected(id) => {
            let all_users: BTreeSet<UserId> = state.scope.users().iter().copied().collect();
            let option = next.option_mut(id);
            option.selected = !option.selected;
            option.users = if option.selected {
                all_users
            } else {
                BTreeSet::new()
            };
        }
        Action::TogglePeerSelected { user, option: id } => {
            if state.scope.contains_user(user) {
                let option = next.option_mut(id);
                if !option.users.remove(&user) {
                    option.users.insert(user);
                }
                option.selected = !option.users.is_empty();
            }
        }
    }

    next
}
