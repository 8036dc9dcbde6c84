//! The authorization store.
//!
//! A single in-memory map from user id to expiration instant, plus the
//! decision functions that operate on it. The store has no outbound side
//! effects: it returns decisions and outcomes for the transport layer to
//! act on. State lives only for the lifetime of the process.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info};

use super::duration::parse_duration;
use super::types::{
    AccessDecision, AccessRequest, Approval, AuthError, RequestOutcome, UserId,
};

/// IST (+05:30). Fixed offset, no DST.
const DISPLAY_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// In-memory authorization state.
///
/// The admin identity is held separately and is never a key in the map;
/// it is implicitly authorized forever and checked before any lookup.
#[derive(Debug)]
pub struct AuthStore {
    /// The single privileged identity.
    admin: UserId,

    /// Approved users and when their grants expire (UTC).
    approved: HashMap<UserId, DateTime<Utc>>,
}

impl AuthStore {
    /// Creates an empty store gated by the given admin identity.
    #[must_use]
    pub fn new(admin: UserId) -> Self {
        Self {
            admin,
            approved: HashMap::new(),
        }
    }

    /// The configured admin identity.
    #[must_use]
    pub fn admin(&self) -> &UserId {
        &self.admin
    }

    /// Number of live-or-stale grants currently held.
    #[must_use]
    pub fn grant_count(&self) -> usize {
        self.approved.len()
    }

    /// Checks whether a user may interact with the bot.
    ///
    /// Takes `&mut self` because an expired grant is removed by the check
    /// that observes it (expire-on-read). The removal happens once; later
    /// checks for the same user land in the not-authorized branch.
    pub fn check(&mut self, user: &UserId) -> AccessDecision {
        self.check_at(user, Utc::now())
    }

    /// Check against an explicit instant. Seam for expiry tests.
    pub fn check_at(&mut self, user: &UserId, now: DateTime<Utc>) -> AccessDecision {
        if *user == self.admin {
            return AccessDecision::Granted;
        }

        let Some(&expires_at) = self.approved.get(user) else {
            return AccessDecision::NotAuthorized;
        };

        if now >= expires_at {
            self.approved.remove(user);
            debug!("Grant for {} expired at {}, removed", user, expires_at);
            return AccessDecision::Expired;
        }

        AccessDecision::Granted
    }

    /// Grants the target time-limited access. Admin-only; fails closed
    /// when the acting identity is not the admin, leaving the map intact.
    ///
    /// Any existing grant for the target is overwritten unconditionally.
    pub fn approve(
        &mut self,
        target: &UserId,
        acting_admin: &UserId,
        raw_duration: Option<&str>,
    ) -> Result<Approval, AuthError> {
        self.approve_at(target, acting_admin, raw_duration, Utc::now())
    }

    /// Approve against an explicit instant. Seam for expiry tests.
    pub fn approve_at(
        &mut self,
        target: &UserId,
        acting_admin: &UserId,
        raw_duration: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Approval, AuthError> {
        if *acting_admin != self.admin {
            return Err(AuthError::Forbidden);
        }

        let duration = parse_duration(raw_duration);
        let expires_at = now
            .checked_add_signed(duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.approved.insert(target.clone(), expires_at);
        info!("Approved {} until {}", target, expires_at);

        Ok(Approval {
            expires_at,
            display: format_display(expires_at),
        })
    }

    /// Handles an access request from a user.
    ///
    /// Membership in the map counts as authorized here even if the grant
    /// is stale but unread; the next gated message expires it. No mutation.
    pub fn request_access(
        &self,
        requester: &UserId,
        username: Option<&str>,
    ) -> RequestOutcome {
        if *requester == self.admin || self.approved.contains_key(requester) {
            return RequestOutcome::AlreadyAuthorized;
        }

        RequestOutcome::Forwarded(AccessRequest {
            user_id: requester.clone(),
            username: username.map(str::to_owned),
        })
    }

    /// Rejects a pending access request. Admin-only, same gating as
    /// [`Self::approve`].
    ///
    /// Deny is not revocation: an existing grant for the target survives.
    /// Callers relying on deny to cut off a previously approved user will
    /// be disappointed.
    pub fn deny(&self, target: &UserId, acting_admin: &UserId) -> Result<(), AuthError> {
        if *acting_admin != self.admin {
            return Err(AuthError::Forbidden);
        }

        debug!("Denied access request from {}", target);
        Ok(())
    }
}

/// Renders an expiration instant in the fixed display zone (IST, 12-hour
/// clock). Presentation only; the stored value stays UTC.
fn format_display(instant: DateTime<Utc>) -> String {
    match FixedOffset::east_opt(DISPLAY_OFFSET_SECS) {
        Some(ist) => instant
            .with_timezone(&ist)
            .format("%Y-%m-%d %I:%M:%S %p IST")
            .to_string(),
        // Offset is a constant within range; this arm is unreachable.
        None => instant.format("%Y-%m-%d %I:%M:%S %p UTC").to_string(),
    }
}
