//! Telegram transport module.
//!
//! Wraps the grammers client behind the small surface the gate needs:
//! connect, bot sign-in, send, delete, and raw-update conversion.

mod client;
mod updates;

pub use client::{GateBot, RawUpdatesReceiver, TelegramError};
pub use updates::{extract_messages, InboundMessage};
