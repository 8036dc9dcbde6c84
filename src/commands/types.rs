//! Command types and parsing.

use std::fmt;

use crate::auth::UserId;

/// Arguments for the approve command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveArgs {
    /// The user being granted access.
    pub target: UserId,

    /// Raw duration string, forwarded verbatim to the duration parser.
    pub duration: Option<String>,
}

/// Commands the gate understands.
///
/// Commands missing their required argument still parse (as the `None`
/// variants) so the handler can reply with a usage hint instead of
/// silently dropping the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Request access to the bot.
    Start,

    /// Grant a user time-limited access (admin only).
    Approve(Option<ApproveArgs>),

    /// Reject a pending access request (admin only).
    Deny(Option<UserId>),
}

impl BotCommand {
    /// Whether a message text is shaped like a command at all.
    ///
    /// The message gate skips anything command-shaped, even commands the
    /// bot does not know.
    #[must_use]
    pub fn is_command(text: &str) -> bool {
        text.trim_start().starts_with('/')
    }

    /// Parses a command from a message text.
    ///
    /// Returns `None` if the message is not a command this bot handles.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;

        let (cmd, args) = match rest.split_once(char::is_whitespace) {
            Some((cmd, args)) => (cmd, Some(args.trim())),
            None => (rest, None),
        };

        // Telegram clients may address commands as /cmd@botname.
        let cmd = cmd
            .split_once('@')
            .map_or(cmd, |(name, _)| name)
            .to_lowercase();

        let args = args.filter(|a| !a.is_empty());

        match cmd.as_str() {
            "start" => Some(Self::Start),
            "approve" => Some(Self::Approve(args.map(Self::parse_approve_args))),
            "deny" => Some(Self::Deny(args.map(|a| Self::first_word(a).into()))),
            _ => None,
        }
    }

    /// Parses approve arguments: `<user_id> [duration]`.
    fn parse_approve_args(args: &str) -> ApproveArgs {
        let mut parts = args.split_whitespace();
        let target = parts.next().unwrap_or(args).into();
        let duration = parts.next().map(str::to_owned);

        ApproveArgs { target, duration }
    }

    fn first_word(args: &str) -> &str {
        args.split_whitespace().next().unwrap_or(args)
    }
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Approve(Some(args)) => match &args.duration {
                Some(d) => write!(f, "approve {} {d}", args.target),
                None => write!(f, "approve {}", args.target),
            },
            Self::Approve(None) => write!(f, "approve"),
            Self::Deny(Some(target)) => write!(f, "deny {target}"),
            Self::Deny(None) => write!(f, "deny"),
        }
    }
}

/// An outbound message addressed to a specific user, typically the admin
/// or the target of an admin action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Who receives the message.
    pub recipient: UserId,

    /// Message text.
    pub text: String,
}

/// What the transport should do after a command is handled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Reply to send back to the command's sender.
    pub reply: Option<String>,

    /// Messages to deliver elsewhere.
    pub notices: Vec<Notice>,
}

impl CommandOutcome {
    /// Creates an outcome that only replies to the sender.
    #[must_use]
    pub fn reply(message: impl Into<String>) -> Self {
        Self {
            reply: Some(message.into()),
            notices: Vec::new(),
        }
    }

    /// Adds a notice addressed to another user.
    #[must_use]
    pub fn with_notice(mut self, recipient: UserId, text: impl Into<String>) -> Self {
        self.notices.push(Notice {
            recipient,
            text: text.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start() {
        assert_eq!(BotCommand::parse("/start"), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("  /start  "), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/START"), Some(BotCommand::Start));
    }

    #[test]
    fn test_parse_with_bot_mention() {
        assert_eq!(
            BotCommand::parse("/start@my_gate_bot"),
            Some(BotCommand::Start)
        );
    }

    #[test]
    fn test_parse_approve_with_duration() {
        assert_eq!(
            BotCommand::parse("/approve 12345 1m"),
            Some(BotCommand::Approve(Some(ApproveArgs {
                target: UserId::new("12345"),
                duration: Some("1m".to_owned()),
            })))
        );
    }

    #[test]
    fn test_parse_approve_without_duration() {
        assert_eq!(
            BotCommand::parse("/approve 12345"),
            Some(BotCommand::Approve(Some(ApproveArgs {
                target: UserId::new("12345"),
                duration: None,
            })))
        );
    }

    #[test]
    fn test_parse_approve_without_args() {
        assert_eq!(
            BotCommand::parse("/approve"),
            Some(BotCommand::Approve(None))
        );
        assert_eq!(
            BotCommand::parse("/approve   "),
            Some(BotCommand::Approve(None))
        );
    }

    #[test]
    fn test_parse_deny() {
        assert_eq!(
            BotCommand::parse("/deny 12345"),
            Some(BotCommand::Deny(Some(UserId::new("12345"))))
        );
        assert_eq!(BotCommand::parse("/deny"), Some(BotCommand::Deny(None)));
    }

    #[test]
    fn test_parse_non_command() {
        assert_eq!(BotCommand::parse("hello there"), None);
        assert_eq!(BotCommand::parse(""), None);
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(BotCommand::parse("/help"), None);
        assert_eq!(BotCommand::parse("/startx"), None);
    }

    #[test]
    fn test_is_command() {
        assert!(BotCommand::is_command("/anything"));
        assert!(BotCommand::is_command("  /start"));
        assert!(!BotCommand::is_command("plain message"));
    }

    #[test]
    fn test_outcome_builders() {
        let outcome = CommandOutcome::reply("ok").with_notice(UserId::new("1"), "hello");
        assert_eq!(outcome.reply.as_deref(), Some("ok"));
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].recipient, UserId::new("1"));
    }
}
