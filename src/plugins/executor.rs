//! Runs the requests planned by a confirmed cleanup dialog.
//!
//! Each request is spawned on its own; failures are logged and never
//! reach the dialog. Messages being reported are forwarded to the report
//! chat in the background before any request that deletes messages runs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatPermissions, MessageId, UserId};
use tracing::{debug, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::database::SpamReport;
use crate::moderation::{BannedRights, Request, TargetScope, UNTIL_FOREVER};

/// Who submitted the requests and over which scope.
#[derive(Clone)]
pub struct Submission {
    pub moderator: UserId,
    pub scope: Arc<TargetScope>,
}

/// Bot API call a banned-rights update maps to.
#[derive(Debug, Clone, PartialEq)]
enum MemberUpdate {
    Ban {
        until: Option<DateTime<Utc>>,
    },
    Restrict {
        permissions: ChatPermissions,
        until: Option<DateTime<Utc>>,
    },
}

fn member_update(rights: BannedRights, until: i32) -> MemberUpdate {
    let until = (until != UNTIL_FOREVER)
        .then(|| DateTime::from_timestamp(i64::from(until), 0))
        .flatten();

    if rights.contains(BannedRights::VIEW_MESSAGES) {
        MemberUpdate::Ban { until }
    } else {
        MemberUpdate::Restrict {
            permissions: rights.to_chat_permissions(),
            until,
        }
    }
}

fn removes_messages(request: &Request) -> bool {
    matches!(
        request,
        Request::DeleteMessages { .. } | Request::ClearUserHistory { .. }
    )
}

/// Messages to forward to `report_chat` before anything is deleted.
fn evidence(requests: &[Request], report_chat: Option<i64>) -> Vec<(ChatId, Vec<MessageId>)> {
    if report_chat.is_none() {
        return Vec::new();
    }

    requests
        .iter()
        .filter_map(|request| match request {
            Request::ReportSpam { chat, ids } => Some((*chat, ids.clone())),
            _ => None,
        })
        .collect()
}

/// Spawn every request and return at once.
///
/// With evidence to forward, deleting requests are held back by a
/// background task until forwarding finishes.
pub fn execute(bot: &ThrottledBot, state: &AppState, submission: &Submission, requests: Vec<Request>) {
    let evidence = evidence(&requests, state.report_chat_id);
    let (deleting, others): (Vec<Request>, Vec<Request>) = requests.into_iter().partition(removes_messages);

    match state.report_chat_id {
        Some(report_chat) if !evidence.is_empty() => {
            let bot = bot.clone();
            let state = state.clone();
            let submission = submission.clone();

            tokio::spawn(async move {
                for (chat, ids) in &evidence {
                    forward_evidence(&bot, ChatId(report_chat), *chat, ids).await;
                }
                for request in deleting {
                    spawn_request(&bot, &state, &submission, request);
                }
            });
        }
        _ => {
            for request in deleting {
                spawn_request(bot, state, submission, request);
            }
        }
    }

    for request in others {
        spawn_request(bot, state, submission, request);
    }
}

fn spawn_request(bot: &ThrottledBot, state: &AppState, submission: &Submission, request: Request) {
    let bot = bot.clone();
    let state = state.clone();
    let submission = submission.clone();

    tokio::spawn(async move {
        let label = describe(&request);
        if let Err(e) = run(&bot, &state, &submission, request).await {
            warn!("Cleanup request {} failed: {}", label, e);
        }
    });
}

fn describe(request: &Request) -> String {
    match request {
        Request::DeleteMessages { chat, ids, .. } => format!("delete {} in {}", ids.len(), chat),
        Request::UpdateBannedRights { chat, user, .. } => format!("restrict {} in {}", user, chat),
        Request::ReportSpam { chat, ids } => format!("report {} in {}", ids.len(), chat),
        Request::ClearUserHistory { chat, user } => format!("clear {} in {}", user, chat),
    }
}

async fn run(
    bot: &ThrottledBot,
    state: &AppState,
    submission: &Submission,
    request: Request,
) -> anyhow::Result<()> {
    match request {
        Request::DeleteMessages { chat, ids, .. } => {
            let deleted = delete_messages_batch(bot, chat, &ids).await;
            debug!("Deleted {}/{} selected messages in {}", deleted, ids.len(), chat);
        }
        Request::UpdateBannedRights {
            chat,
            user,
            rights,
            until,
        } => {
            update_banned_rights(bot, chat, user, rights, until).await?;
        }
        Request::ReportSpam { chat, ids } => {
            report_spam(state, submission, chat, &ids).await?;
        }
        Request::ClearUserHistory { chat, user } => {
            let ids = state.message_log.take_user_messages(chat.0, user.0).await?;
            let ids: Vec<MessageId> = ids.into_iter().map(MessageId).collect();
            let deleted = delete_messages_batch(bot, chat, &ids).await;
            debug!("Cleared {} logged messages of {} in {}", deleted, user, chat);
        }
    }

    Ok(())
}

async fn update_banned_rights(
    bot: &ThrottledBot,
    chat: ChatId,
    user: UserId,
    rights: BannedRights,
    until: i32,
) -> anyhow::Result<()> {
    match member_update(rights, until) {
        MemberUpdate::Ban { until } => {
            let mut request = bot.ban_chat_member(chat, user);
            if let Some(dt) = until {
                request = request.until_date(dt);
            }
            request.await?;
            debug!("Banned {} in {}", user, chat);
        }
        MemberUpdate::Restrict { permissions, until } => {
            let mut request = bot
                .restrict_chat_member(chat, user, permissions)
                .use_independent_chat_permissions(true);
            if let Some(dt) = until {
                request = request.until_date(dt);
            }
            request.await?;
            debug!("Restricted {} in {} to {:?}", user, chat, rights);
        }
    }

    Ok(())
}

async fn report_spam(
    state: &AppState,
    submission: &Submission,
    chat: ChatId,
    ids: &[MessageId],
) -> anyhow::Result<()> {
    let report = SpamReport::new(
        chat.0,
        ids.iter().map(|id| id.0).collect(),
        submission.scope.users().iter().map(|u| u.0).collect(),
        submission.moderator.0,
    );
    state.spam_reports.insert(&report).await
}

async fn forward_evidence(bot: &ThrottledBot, report_chat: ChatId, chat: ChatId, ids: &[MessageId]) {
    for &id in ids {
        if let Err(e) = bot.forward_message(report_chat, chat, id).await {
            debug!("Could not forward reported message {} from {}: {}", id, chat, e);
        }
    }
}

/// Delete messages one by one, returning how many were removed.
async fn delete_messages_batch(bot: &ThrottledBot, chat_id: ChatId, message_ids: &[MessageId]) -> usize {
    let mut deleted = 0;

    for &msg_id in message_ids {
        if bot.delete_message(chat_id, msg_id).await.is_ok() {
            deleted += 1;
        }
    }

    deleted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_messages_means_a_permanent_ban() {
        assert_eq!(
            member_update(BannedRights::VIEW_MESSAGES | BannedRights::SEND_TEXT, UNTIL_FOREVER),
            MemberUpdate::Ban { until: None }
        );
    }

    #[test]
    fn partial_rights_restrict_with_an_optional_date() {
        let rights = BannedRights::SEND_MEDIA | BannedRights::PIN_MESSAGES;

        match member_update(rights, UNTIL_FOREVER) {
            MemberUpdate::Restrict { permissions, until } => {
                assert_eq!(permissions, rights.to_chat_permissions());
                assert_eq!(until, None);
            }
            other => panic!("expected a restriction, got {other:?}"),
        }

        match member_update(rights, 1_700_000_000) {
            MemberUpdate::Restrict { until, .. } => {
                assert_eq!(until.map(|dt| dt.timestamp()), Some(1_700_000_000));
            }
            other => panic!("expected a restriction, got {other:?}"),
        }
    }

    #[test]
    fn evidence_only_with_a_report_chat() {
        let chat = ChatId(-100);
        let requests = vec![
            Request::DeleteMessages {
                chat,
                ids: vec![MessageId(1), MessageId(2)],
                revoke: true,
            },
            Request::ReportSpam {
                chat,
                ids: vec![MessageId(1), MessageId(2)],
            },
            Request::ClearUserHistory { chat, user: UserId(7) },
        ];

        assert!(evidence(&requests, None).is_empty());
        assert_eq!(
            evidence(&requests, Some(-200)),
            vec![(chat, vec![MessageId(1), MessageId(2)])]
        );

        let held: Vec<bool> = requests.iter().map(removes_messages).collect();
        assert_eq!(held, vec![true, false, true]);
    }
}
