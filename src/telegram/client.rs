//! Telegram client wrapper for the access gate.

use std::sync::Arc;

use grammers_client::{sender, Client, InvocationError, SenderPool};
use grammers_session::storages::SqliteSession;
use grammers_session::{PackedChat, PackedType};
use grammers_tl_types as tl;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::auth::UserId;
use crate::config::TelegramConfig;

/// Receiver of raw updates from the sender pool.
pub type RawUpdatesReceiver =
    tokio::sync::mpsc::UnboundedReceiver<grammers_session::updates::UpdatesLike>;

/// Errors that can occur during Telegram operations.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Not authorized. Bot sign-in required.")]
    NotAuthorized,

    #[error("Sign in failed: {0}")]
    SignInFailed(String),

    #[error("Cannot address peer: {0} is not a numeric Telegram id")]
    InvalidPeer(String),

    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("API invocation error: {0}")]
    Invocation(String),
}

impl From<InvocationError> for TelegramError {
    fn from(err: InvocationError) -> Self {
        let err_str = err.to_string();

        if (err_str.contains("FLOOD_WAIT") || err_str.contains("flood"))
            && let Some(seconds) = extract_flood_wait_seconds(&err_str)
        {
            return Self::FloodWait(seconds);
        }

        Self::Invocation(err_str)
    }
}

/// Extracts flood wait seconds from an error message.
fn extract_flood_wait_seconds(err_msg: &str) -> Option<u32> {
    let patterns = ["FLOOD_WAIT_", "flood wait "];

    for pattern in patterns {
        if let Some(idx) = err_msg.to_lowercase().find(&pattern.to_lowercase()) {
            let start = idx + pattern.len();
            let num_str: String = err_msg[start..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            if let Ok(seconds) = num_str.parse() {
                return Some(seconds);
            }
        }
    }
    None
}

/// High-level Telegram client wrapper for the gate.
pub struct GateBot {
    /// The underlying grammers client.
    client: Client,

    /// Handle to the sender pool for disconnection.
    handle: sender::SenderPoolHandle,

    /// Background task running the sender pool.
    _pool_task: JoinHandle<()>,
}

impl GateBot {
    /// Connects to Telegram with the given configuration.
    ///
    /// Returns the bot plus the raw updates receiver the event loop
    /// consumes.
    ///
    /// # Errors
    ///
    /// Returns an error if connection fails.
    pub async fn connect(
        config: &TelegramConfig,
    ) -> Result<(Self, RawUpdatesReceiver), TelegramError> {
        info!("Connecting to Telegram...");

        let session = Arc::new(
            SqliteSession::open(&config.session_path)
                .await
                .map_err(|e| TelegramError::Session(e.to_string()))?,
        );

        let SenderPool {
            runner,
            updates,
            handle,
        } = SenderPool::new(Arc::clone(&session), config.api_id);

        let client = Client::new(handle.clone());

        // Spawn the sender pool runner
        let pool_task = tokio::spawn(async move {
            runner.run().await;
        });

        let is_authorized = client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))?;

        info!("Connected to Telegram. Authorized: {}", is_authorized);

        Ok((
            Self {
                client,
                handle: handle.thin,
                _pool_task: pool_task,
            },
            updates,
        ))
    }

    /// Checks if the client is authorized.
    ///
    /// # Errors
    ///
    /// Returns an error if the check fails.
    pub async fn is_authorized(&self) -> Result<bool, TelegramError> {
        self.client
            .is_authorized()
            .await
            .map_err(|e| TelegramError::Connection(e.to_string()))
    }

    /// Signs in as a bot using the configured bot token.
    ///
    /// # Errors
    ///
    /// Returns an error if sign in fails.
    pub async fn sign_in_bot(&self, config: &TelegramConfig) -> Result<(), TelegramError> {
        info!("Signing in with bot token...");

        let request = tl::functions::auth::ImportBotAuthorization {
            flags: 0,
            api_id: config.api_id,
            api_hash: config.api_hash.clone(),
            bot_auth_token: config.bot_token.clone(),
        };

        self.client
            .invoke(&request)
            .await
            .map(|_| ())
            .map_err(|e| TelegramError::SignInFailed(e.to_string()))
    }

    /// Sends a text message to a user's private chat.
    ///
    /// Returns the id of the sent message so callers can delete it later.
    ///
    /// # Errors
    ///
    /// Returns an error if the peer is not addressable or the send fails.
    pub async fn send_text(&self, user: &UserId, text: &str) -> Result<i32, TelegramError> {
        let peer = peer_for(user)?;

        debug!("Sending message to {}", user);
        let message = self.client.send_message(peer, text).await?;

        Ok(message.id())
    }

    /// Deletes messages in a user's private chat. Best-effort from the
    /// caller's point of view; the transport still surfaces the error so
    /// the caller can log it.
    ///
    /// # Errors
    ///
    /// Returns an error if the peer is not addressable or deletion fails.
    pub async fn delete_messages(
        &self,
        user: &UserId,
        message_ids: &[i32],
    ) -> Result<usize, TelegramError> {
        let peer = peer_for(user)?;

        debug!("Deleting {} message(s) for {}", message_ids.len(), user);
        let deleted = self.client.delete_messages(peer, message_ids).await?;

        if deleted < message_ids.len() {
            warn!(
                "Only {}/{} messages deleted for {}",
                deleted,
                message_ids.len(),
                user
            );
        }

        Ok(deleted)
    }

    /// Disconnects from Telegram.
    pub fn disconnect(&self) {
        info!("Disconnecting from Telegram...");
        self.handle.quit();
    }
}

impl std::fmt::Debug for GateBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateBot").finish_non_exhaustive()
    }
}

/// Builds a packed peer for a user's private chat.
///
/// Bots can address users they have exchanged messages with by id alone;
/// the session cache supplies the access hash when one is needed.
fn peer_for(user: &UserId) -> Result<PackedChat, TelegramError> {
    let id = user
        .as_i64()
        .ok_or_else(|| TelegramError::InvalidPeer(user.to_string()))?;

    Ok(PackedChat {
        ty: PackedType::User,
        id,
        access_hash: None,
    })
}
