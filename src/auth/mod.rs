//! Authorization core.
//!
//! Owns the mapping of user identity to expiration instant and the
//! decision functions for granting, checking, and expiring access.
//! Records expire on read: a stale grant is removed by the first check
//! that observes it as expired, never by a background sweep.

mod duration;
mod store;
mod types;

pub use duration::parse_duration;
pub use store::AuthStore;
pub use types::{
    AccessDecision, AccessRequest, Approval, AuthError, RequestOutcome, UserId,
};
