//! Access Gate Bot - Main Entry Point
//!
//! A Telegram bot gatekeeper: admin-approved, time-limited access, with
//! automatic removal of messages from unauthorized users.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use access_gate_bot::auth::{AuthStore, UserId};
use access_gate_bot::commands::{BotCommand, CommandHandler, CommandOutcome};
use access_gate_bot::config::{GateSettings, TelegramConfig};
use access_gate_bot::telegram::{extract_messages, GateBot, InboundMessage};

/// Warning shown to unauthorized senders before their message is removed.
const GATE_WARNING: &str = "🚫 Contact Admin for Authorization!";

/// Telegram bot gatekeeper with admin-approved, time-limited access.
#[derive(Parser, Debug)]
#[command(name = "access_gate_bot")]
#[command(about = "Gate a Telegram bot behind admin-approved, time-limited access")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configurations
    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;

    let settings =
        GateSettings::from_env().context("Failed to load gate settings from environment")?;

    info!("Admin identity: {}", settings.admin_id);

    // Connect to Telegram
    let (bot, mut updates) = GateBot::connect(&tg_config)
        .await
        .context("Failed to connect to Telegram")?;

    // Sign in with the bot token if needed
    if !bot.is_authorized().await.context("Failed to check authorization")? {
        bot.sign_in_bot(&tg_config)
            .await
            .context("Bot sign-in failed")?;
        info!("Signed in with bot token");
    }

    // All grants live in memory only; a restart clears them.
    let store = Arc::new(RwLock::new(AuthStore::new(settings.admin_id.clone())));
    let handler = Arc::new(CommandHandler::new(Arc::clone(&store)));
    let bot = Arc::new(bot);

    info!("Access gate bot started. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
            update = updates.recv() => {
                let Some(update) = update else {
                    warn!("Update stream closed");
                    break;
                };

                for inbound in extract_messages(&update) {
                    dispatch(
                        Arc::clone(&bot),
                        Arc::clone(&handler),
                        &settings,
                        inbound,
                    )
                    .await;
                }
            }
        }
    }

    info!("Shutting down...");
    bot.disconnect();

    Ok(())
}

/// Routes one inbound message: known commands go to the handler, unknown
/// commands are ignored, and everything else passes through the gate.
async fn dispatch(
    bot: Arc<GateBot>,
    handler: Arc<CommandHandler>,
    settings: &GateSettings,
    inbound: InboundMessage,
) {
    if BotCommand::is_command(&inbound.text) {
        if let Some(command) = BotCommand::parse(&inbound.text) {
            let outcome = handler
                .handle(&inbound.sender, inbound.username.as_deref(), command)
                .await;
            deliver(&bot, &inbound.sender, outcome).await;
        } else {
            debug!("Ignoring unknown command from {}", inbound.sender);
        }
    } else {
        gate_message(bot, handler, settings, inbound).await;
    }
}

/// Sends a command outcome: the reply to the sender plus any notices.
/// Delivery failures are logged and swallowed; they are never fatal.
async fn deliver(bot: &GateBot, sender: &UserId, outcome: CommandOutcome) {
    if let Some(reply) = outcome.reply
        && let Err(e) = bot.send_text(sender, &reply).await
    {
        warn!("Failed to reply to {}: {}", sender, e);
    }

    for notice in outcome.notices {
        if let Err(e) = bot.send_text(&notice.recipient, &notice.text).await {
            warn!("Failed to notify {}: {}", notice.recipient, e);
        }
    }
}

/// Runs the authorization check on a non-command message and, when the
/// sender is unauthorized, warns them and removes both messages after a
/// short delay.
///
/// The cleanup runs as a detached task with no cancellation: if the
/// admin approves the sender during the delay window, the message and
/// warning are still deleted. Accepted race.
async fn gate_message(
    bot: Arc<GateBot>,
    handler: Arc<CommandHandler>,
    settings: &GateSettings,
    inbound: InboundMessage,
) {
    let decision = handler.authorize(&inbound.sender).await;
    if decision.is_authorized() {
        return;
    }

    debug!(
        "Gating message {} from unauthorized sender {}",
        inbound.message_id, inbound.sender
    );

    let delay = settings.cleanup_delay();
    tokio::spawn(async move {
        let warning_id = match bot.send_text(&inbound.sender, GATE_WARNING).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("Failed to warn {}: {}", inbound.sender, e);
                None
            }
        };

        tokio::time::sleep(delay).await;

        let mut ids = vec![inbound.message_id];
        ids.extend(warning_id);

        // Best-effort: the message may already be gone or the bot may
        // lack delete permission.
        if let Err(e) = bot.delete_messages(&inbound.sender, &ids).await {
            warn!(
                "Failed to delete unauthorized messages for {}: {}",
                inbound.sender, e
            );
        }
    });
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
