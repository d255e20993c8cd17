//! Inline keyboard callback data for dialog buttons.
//!
//! Format: `cl:<dialog id>:<verb>`. Telegram caps callback data at 64 bytes,
//! so verbs are single letters followed by compact arguments.

use teloxide::types::UserId;
use thiserror::Error;

use super::rights::BannedRights;
use super::state::{Action, OptionId};

pub const PREFIX: &str = "cl:";

/// What a dialog button asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogCommand {
    Apply(Action),
    Confirm,
    Cancel,
    /// Button on a non-interactive row.
    Noop,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackError {
    #[error("callback data does not belong to a cleanup dialog")]
    Prefix,
    #[error("invalid dialog id: {0}")]
    DialogId(String),
    #[error("unknown verb: {0}")]
    Verb(String),
    #[error("unknown option code: {0}")]
    Option(String),
    #[error("invalid right bits: {0}")]
    Right(String),
    #[error("invalid user id: {0}")]
    User(String),
}

fn option_code(option: OptionId) -> char {
    match option {
        OptionId::Report => 'r',
        OptionId::DeleteAll => 'd',
        OptionId::Ban => 'b',
    }
}

fn parse_option(code: &str) -> Result<OptionId, CallbackError> {
    match code {
        "r" => Ok(OptionId::Report),
        "d" => Ok(OptionId::DeleteAll),
        "b" => Ok(OptionId::Ban),
        other => Err(CallbackError::Option(other.to_string())),
    }
}

/// Encode a button press for dialog `dialog`.
pub fn encode(dialog: u64, command: &DialogCommand) -> String {
    let verb = match command {
        DialogCommand::Apply(Action::SetBanMode { full: true }) => "bf".to_string(),
        DialogCommand::Apply(Action::SetBanMode { full: false }) => "bp".to_string(),
        DialogCommand::Apply(Action::ToggleRight { right, enable }) => {
            format!("r{}{}", right.bits(), if *enable { '+' } else { '-' })
        }
        DialogCommand::Apply(Action::ToggleMediaRevealed) => "m".to_string(),
        DialogCommand::Apply(Action::ToggleReveal(option)) => format!("v{}", option_code(*option)),
        DialogCommand::Apply(Action::ToggleSelected(option)) => format!("s{}", option_code(*option)),
        DialogCommand::Apply(Action::TogglePeerSelected { user, option }) => {
            format!("p{}{}", option_code(*option), user.0)
        }
        DialogCommand::Confirm => "ok".to_string(),
        DialogCommand::Cancel => "x".to_string(),
        DialogCommand::Noop => "n".to_string(),
    };
    format!("{PREFIX}{dialog}:{verb}")
}

/// Decode callback data into the dialog id and the command.
pub fn decode(data: &str) -> Result<(u64, DialogCommand), CallbackError> {
    let rest = data.strip_prefix(PREFIX).ok_or(CallbackError::Prefix)?;
    let (id, verb) = rest
        .split_once(':')
        .ok_or_else(|| CallbackError::DialogId(rest.to_string()))?;
    let id: u64 = id
        .parse()
        .map_err(|_| CallbackError::DialogId(id.to_string()))?;

    let command = match verb {
        "bf" => DialogCommand::Apply(Action::SetBanMode { full: true }),
        "bp" => DialogCommand::Apply(Action::SetBanMode { full: false }),
        "m" => DialogCommand::Apply(Action::ToggleMediaRevealed),
        "ok" => DialogCommand::Confirm,
        "x" => DialogCommand::Cancel,
        "n" => DialogCommand::Noop,
        _ if verb.len() >= 2 && verb.is_char_boundary(1) => {
            let (head, args) = verb.split_at(1);
            match head {
                "v" => DialogCommand::Apply(Action::ToggleReveal(parse_option(args)?)),
                "s" => DialogCommand::Apply(Action::ToggleSelected(parse_option(args)?)),
                "p" if args.is_char_boundary(1) => {
                    let (option, user) = args.split_at(1);
                    let user: u64 = user
                        .parse()
                        .map_err(|_| CallbackError::User(user.to_string()))?;
                    DialogCommand::Apply(Action::TogglePeerSelected {
                        user: UserId(user),
                        option: parse_option(option)?,
                    })
                }
                "r" => decode_right(args)?,
                _ => return Err(CallbackError::Verb(verb.to_string())),
            }
        }
        _ => return Err(CallbackError::Verb(verb.to_string())),
    };

    Ok((id, command))
}

fn decode_right(args: &str) -> Result<DialogCommand, CallbackError> {
    let (bits, enable) = if let Some(bits) = args.strip_suffix('+') {
        (bits, true)
    } else if let Some(bits) = args.strip_suffix('-') {
        (bits, false)
    } else {
        return Err(CallbackError::Right(args.to_string()));
    };

    let right = bits
        .parse::<u32>()
        .ok()
        .and_then(BannedRights::from_bits)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| CallbackError::Right(bits.to_string()))?;

    Ok(DialogCommand::Apply(Action::ToggleRight { right, enable }))
}
