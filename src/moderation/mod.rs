//! Cleanup dialog core.
//!
//! A moderator picks messages, and the dialog lets them delete them, report
//! them as spam, wipe their authors' recent history and ban or restrict the
//! authors. Everything here is synchronous and free of Telegram I/O:
//!
//! - `rights` - Banned-rights flags and the dependency table
//! - `scope` - Messages and users a dialog acts on
//! - `state` - Form snapshots and the reducer
//! - `entries` - Ordered display entries derived from a snapshot
//! - `submit` - Backend requests for a confirmed snapshot
//! - `dialog` - Open dialogs publishing snapshots over `watch`
//! - `callback` - Button payload codec

pub mod callback;
pub mod dialog;
pub mod entries;
pub mod rights;
pub mod scope;
pub mod state;
pub mod submit;

pub use callback::DialogCommand;
pub use dialog::{Dialog, DialogStore};
pub use entries::{Description, DisplayEntry, OptionRow, PeerRow, Position, RightRow, StaticConfig};
pub use rights::BannedRights;
pub use scope::{Author, ScopedMessage, TargetScope};
pub use state::{Action, OptionId};
pub use submit::{Request, UNTIL_FOREVER};
