//! Command handler implementation.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use super::types::{ApproveArgs, BotCommand, CommandOutcome};
use crate::auth::{AccessDecision, AuthError, AuthStore, RequestOutcome, UserId};

const NOT_ADMIN_REPLY: &str = "🚫 Not authorized to use this command.";
const APPROVE_USAGE: &str =
    "✅ Use: /approve USER_ID DURATION\nExample: /approve 123456 1m";
const DENY_USAGE: &str = "❌ Provide user ID to deny.";

/// Handles bot commands against the shared authorization store.
///
/// Produces [`CommandOutcome`]s describing what to send and to whom; the
/// transport layer performs the actual delivery.
pub struct CommandHandler {
    /// Shared authorization state.
    store: Arc<RwLock<AuthStore>>,
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(store: Arc<RwLock<AuthStore>>) -> Self {
        Self { store }
    }

    /// Runs the authorization check for a non-command message sender.
    pub async fn authorize(&self, sender: &UserId) -> AccessDecision {
        // Write lock: the check removes expired records (expire-on-read).
        self.store.write().await.check(sender)
    }

    /// Executes a parsed command on behalf of its sender.
    pub async fn handle(
        &self,
        sender: &UserId,
        username: Option<&str>,
        command: BotCommand,
    ) -> CommandOutcome {
        debug!("Handling command from {}: {}", sender, command);

        match command {
            BotCommand::Start => self.handle_start(sender, username).await,
            BotCommand::Approve(args) => self.handle_approve(sender, args).await,
            BotCommand::Deny(target) => self.handle_deny(sender, target).await,
        }
    }

    async fn handle_start(&self, sender: &UserId, username: Option<&str>) -> CommandOutcome {
        let store = self.store.read().await;

        match store.request_access(sender, username) {
            RequestOutcome::AlreadyAuthorized => {
                CommandOutcome::reply("✅ You are already authorized!")
            }
            RequestOutcome::Forwarded(request) => {
                info!("Forwarding access request from {} to admin", request.user_id);

                let display_name = request.username.as_deref().unwrap_or("unknown");
                let admin_text = format!(
                    "New user requests access: @{display_name} (ID: {id})\nApprove? Use /approve {id}",
                    id = request.user_id,
                );

                CommandOutcome::reply("☑ Request sent to admin.")
                    .with_notice(store.admin().clone(), admin_text)
            }
        }
    }

    async fn handle_approve(
        &self,
        sender: &UserId,
        args: Option<ApproveArgs>,
    ) -> CommandOutcome {
        // Transport-level gate; the store re-checks and fails closed too.
        if sender != self.store.read().await.admin() {
            return CommandOutcome::reply(NOT_ADMIN_REPLY);
        }

        let Some(args) = args else {
            return CommandOutcome::reply(APPROVE_USAGE);
        };

        let result = self
            .store
            .write()
            .await
            .approve(&args.target, sender, args.duration.as_deref());

        match result {
            Ok(approval) => CommandOutcome::reply(format!(
                "✨ Authorized {} until {}",
                args.target, approval.display
            ))
            .with_notice(
                args.target.clone(),
                format!("🤖 Authorized until {}", approval.display),
            ),
            Err(AuthError::Forbidden) => CommandOutcome::reply(NOT_ADMIN_REPLY),
        }
    }

    async fn handle_deny(&self, sender: &UserId, target: Option<UserId>) -> CommandOutcome {
        if sender != self.store.read().await.admin() {
            return CommandOutcome::reply(NOT_ADMIN_REPLY);
        }

        let Some(target) = target else {
            return CommandOutcome::reply(DENY_USAGE);
        };

        match self.store.read().await.deny(&target, sender) {
            Ok(()) => CommandOutcome::default()
                .with_notice(target, "❌ Request denied by admin."),
            Err(AuthError::Forbidden) => CommandOutcome::reply(NOT_ADMIN_REPLY),
        }
    }
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: &str = "6357920694";
    const USER: &str = "12345";

    fn handler() -> CommandHandler {
        CommandHandler::new(Arc::new(RwLock::new(AuthStore::new(UserId::new(ADMIN)))))
    }

    fn parse(text: &str) -> BotCommand {
        BotCommand::parse(text).unwrap()
    }

    #[tokio::test]
    async fn test_start_forwards_request_to_admin() {
        let handler = handler();
        let outcome = handler
            .handle(&UserId::new(USER), Some("alice"), parse("/start"))
            .await;

        assert_eq!(outcome.reply.as_deref(), Some("☑ Request sent to admin."));
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].recipient, UserId::new(ADMIN));
        assert!(outcome.notices[0].text.contains("@alice"));
        assert!(outcome.notices[0].text.contains(&format!("/approve {USER}")));
    }

    #[tokio::test]
    async fn test_start_when_already_authorized() {
        let handler = handler();
        let outcome = handler
            .handle(&UserId::new(ADMIN), None, parse("/start"))
            .await;

        assert_eq!(outcome.reply.as_deref(), Some("✅ You are already authorized!"));
        assert!(outcome.notices.is_empty());
    }

    #[tokio::test]
    async fn test_approve_grants_and_notifies_target() {
        let handler = handler();
        let outcome = handler
            .handle(&UserId::new(ADMIN), None, parse("/approve 12345 2h"))
            .await;

        assert!(outcome
            .reply
            .as_deref()
            .is_some_and(|r| r.starts_with("✨ Authorized 12345 until ")));
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].recipient, UserId::new(USER));
        assert!(outcome.notices[0].text.contains("Authorized until"));
        assert!(outcome.notices[0].text.contains("IST"));

        assert_eq!(
            handler.authorize(&UserId::new(USER)).await,
            AccessDecision::Granted
        );
    }

    #[tokio::test]
    async fn test_approve_without_args_replies_usage() {
        let handler = handler();
        let outcome = handler
            .handle(&UserId::new(ADMIN), None, parse("/approve"))
            .await;

        assert_eq!(outcome.reply.as_deref(), Some(APPROVE_USAGE));
        assert!(outcome.notices.is_empty());
    }

    #[tokio::test]
    async fn test_approve_from_non_admin_refused() {
        let handler = handler();
        let outcome = handler
            .handle(&UserId::new(USER), None, parse("/approve 777 1h"))
            .await;

        assert_eq!(outcome.reply.as_deref(), Some(NOT_ADMIN_REPLY));
        assert!(outcome.notices.is_empty());

        // And the target gained nothing.
        assert_eq!(
            handler.authorize(&UserId::new("777")).await,
            AccessDecision::NotAuthorized
        );
    }

    #[tokio::test]
    async fn test_deny_notifies_target_without_revoking() {
        let handler = handler();
        handler
            .handle(&UserId::new(ADMIN), None, parse("/approve 12345 1h"))
            .await;

        let outcome = handler
            .handle(&UserId::new(ADMIN), None, parse("/deny 12345"))
            .await;

        assert!(outcome.reply.is_none());
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(
            outcome.notices[0].text,
            "❌ Request denied by admin."
        );

        // Deny is not revocation; the earlier grant survives.
        assert_eq!(
            handler.authorize(&UserId::new(USER)).await,
            AccessDecision::Granted
        );
    }

    #[tokio::test]
    async fn test_deny_without_args_replies_usage() {
        let handler = handler();
        let outcome = handler
            .handle(&UserId::new(ADMIN), None, parse("/deny"))
            .await;

        assert_eq!(outcome.reply.as_deref(), Some(DENY_USAGE));
    }

    #[tokio::test]
    async fn test_deny_from_non_admin_refused() {
        let handler = handler();
        let outcome = handler
            .handle(&UserId::new(USER), None, parse("/deny 777"))
            .await;

        assert_eq!(outcome.reply.as_deref(), Some(NOT_ADMIN_REPLY));
        assert!(outcome.notices.is_empty());
    }

    #[tokio::test]
    async fn test_authorize_unknown_sender() {
        let handler = handler();
        let decision = handler.authorize(&UserId::new(USER)).await;
        assert_eq!(decision, AccessDecision::NotAuthorized);
        assert!(decision.message().is_some());
    }
}
