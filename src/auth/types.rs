//! Identity, decision, and outcome types for the authorization store.

use std::fmt;

use chrono::{DateTime, Utc};

/// Canonical identity of a chat participant.
///
/// Telegram delivers ids as `i64` while the admin id arrives from the
/// environment as text. Mixing the two representations in comparisons is
/// a classic source of silently-failing gates, so every id is normalized
/// to its decimal string form once, at the boundary, and compared as this
/// type everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id from its canonical string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the native Telegram id, if the canonical form is numeric.
    ///
    /// Admin-supplied targets come from free-form command arguments, so
    /// this can fail; callers treat that as an unreachable peer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The user may interact with the bot.
    Granted,

    /// The user has no grant at all.
    NotAuthorized,

    /// The user's grant had expired; it was removed by this check.
    Expired,
}

impl AccessDecision {
    /// Whether the decision allows the interaction.
    #[must_use]
    pub const fn is_authorized(self) -> bool {
        matches!(self, Self::Granted)
    }

    /// The user-facing explanation, when access is refused.
    #[must_use]
    pub const fn message(self) -> Option<&'static str> {
        match self {
            Self::Granted => None,
            Self::NotAuthorized => {
                Some("🚫 You are not authorized. 🔄 Use /start to request access.")
            }
            Self::Expired => {
                Some("⏳ Your authorization has expired. 🔄 Use /start to request new access.")
            }
        }
    }
}

/// A successful approval: the stored instant plus its presentation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    /// When the grant expires. Always UTC; this is what the store keeps.
    pub expires_at: DateTime<Utc>,

    /// Human-readable expiration in the fixed display zone (IST).
    /// Presentation only; never fed back into the store.
    pub display: String,
}

/// A pending access request to be forwarded to the admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    /// The requester's id.
    pub user_id: UserId,

    /// The requester's display name, when Telegram supplied one.
    pub username: Option<String>,
}

/// Outcome of a request-access action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The requester is the admin or already holds a grant.
    AlreadyAuthorized,

    /// The request should be forwarded to the admin.
    Forwarded(AccessRequest),
}

/// Errors from admin-only store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The acting identity is not the configured admin.
    #[error("not authorized to perform admin actions")]
    Forbidden,
}
