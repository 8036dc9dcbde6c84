//! Configuration module for the access gate bot.
//!
//! All configuration comes from the environment (optionally via a `.env`
//! file loaded at startup). There are no configuration files and no
//! persisted state; a restart clears every grant.

mod settings;

pub use settings::{ConfigError, GateSettings, TelegramConfig};
