//! Command handling module.
//!
//! Parses `/start`, `/approve`, and `/deny` from inbound messages and
//! dispatches them against the authorization store.

mod handler;
mod types;

pub use handler::CommandHandler;
pub use types::{ApproveArgs, BotCommand, CommandOutcome, Notice};
