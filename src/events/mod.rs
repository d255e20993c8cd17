//! Event handler system.
//!
//! Add new event handlers by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_event;` below
//! 3. Hooking it into the schema in `bot::dispatcher`

pub mod message_log;

pub use message_log::log_message;
