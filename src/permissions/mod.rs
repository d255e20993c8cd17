//! Permission system for checking moderator rights.
//!
//! Admin lookups hit `getChatMember` once and are cached for a few minutes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! if state.permissions.can_delete_messages(chat_id, user_id).await? {
//!     // open the cleanup dialog
//! }
//! ```

mod checker;

pub use checker::Permissions;
