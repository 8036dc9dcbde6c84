//! Application settings and Telegram configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::UserId;

/// Telegram API configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Telegram API ID (obtain from <https://my.telegram.org>).
    pub api_id: i32,

    /// Telegram API hash (obtain from <https://my.telegram.org>).
    pub api_hash: String,

    /// Bot token (obtain from @BotFather).
    pub bot_token: String,

    /// Path to the session file.
    pub session_path: PathBuf,
}

fn default_session_path() -> PathBuf {
    PathBuf::from("gate-session.db")
}

impl TelegramConfig {
    /// Creates configuration from environment variables.
    ///
    /// Expects `TG_API_ID`, `TG_API_HASH`, and `BOT_TOKEN` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_id: i32 = std::env::var("TG_API_ID")
            .map_err(|_| ConfigError::MissingEnvVar("TG_API_ID"))?
            .parse()
            .map_err(|_| ConfigError::InvalidApiId)?;

        let api_hash = std::env::var("TG_API_HASH")
            .map_err(|_| ConfigError::MissingEnvVar("TG_API_HASH"))?;

        let bot_token = std::env::var("BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("BOT_TOKEN"))?;

        let session_path = std::env::var("TG_SESSION_PATH")
            .map_or_else(|_| default_session_path(), PathBuf::from);

        Ok(Self {
            api_id,
            api_hash,
            bot_token,
            session_path,
        })
    }
}

/// Gate-specific settings.
#[derive(Debug, Clone)]
pub struct GateSettings {
    /// The admin identity. The only required gate setting; everything
    /// the store decides hangs off this value.
    pub admin_id: UserId,

    /// Delay between warning an unauthorized sender and deleting the
    /// offending message plus the warning.
    pub cleanup_delay_secs: u64,
}

fn default_cleanup_delay() -> u64 {
    1
}

impl GateSettings {
    /// Creates gate settings from environment variables.
    ///
    /// Expects `ADMIN_ID` to be set; `CLEANUP_DELAY_SECS` is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if `ADMIN_ID` is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let admin_id = std::env::var("ADMIN_ID")
            .map_err(|_| ConfigError::MissingEnvVar("ADMIN_ID"))
            .map(UserId::new)?;

        let cleanup_delay_secs = std::env::var("CLEANUP_DELAY_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_cleanup_delay);

        Ok(Self {
            admin_id,
            cleanup_delay_secs,
        })
    }

    /// The cleanup delay as a [`Duration`].
    #[must_use]
    pub const fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_delay_secs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid API ID format (must be a positive integer)")]
    InvalidApiId,
}
