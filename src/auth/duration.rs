//! Duration parsing for approval grants.
//!
//! Admin-supplied duration strings follow `<amount><unit>` with unit one
//! of `mins`, `m` (months, approximated as 30 days), or `h`. Anything
//! that does not parse falls back to the one-day default. That fallback
//! is policy, not an error: a typo in `/approve` still grants a day.

use std::sync::OnceLock;

use chrono::Duration;
use regex::Regex;

/// Grant length used when no (or an unrecognized) duration is supplied.
fn default_duration() -> Duration {
    Duration::days(1)
}

/// Matches the whole input as digits immediately followed by a unit.
/// Signs, decimals, and surrounding text all fail the match and take the
/// default instead.
fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::expect_used)] // literal pattern, compiles or nothing does
        Regex::new(r"^(\d+)(mins|m|h)$").expect("duration pattern is valid")
    })
}

/// Parses an optional raw duration string into a grant length.
///
/// - `None` or empty → 1 day.
/// - `<n>mins` → n minutes.
/// - `<n>m` → n months, approximated as n × 30 days.
/// - `<n>h` → n hours.
/// - Anything else (unknown units, zero, decimals, overflow) → 1 day.
#[must_use]
pub fn parse_duration(raw: Option<&str>) -> Duration {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return default_duration();
    };

    let Some(caps) = pattern().captures(raw) else {
        return default_duration();
    };

    let amount: i64 = match caps[1].parse() {
        Ok(n) if n > 0 => n,
        _ => return default_duration(),
    };

    let parsed = match &caps[2] {
        "mins" => Duration::try_minutes(amount),
        "m" => amount.checked_mul(30).and_then(Duration::try_days),
        "h" => Duration::try_hours(amount),
        _ => None,
    };

    parsed.unwrap_or_else(default_duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes() {
        assert_eq!(parse_duration(Some("30mins")), Duration::minutes(30));
        assert_eq!(parse_duration(Some("1mins")), Duration::minutes(1));
    }

    #[test]
    fn test_hours() {
        assert_eq!(parse_duration(Some("2h")), Duration::hours(2));
        assert_eq!(parse_duration(Some("24h")), Duration::hours(24));
    }

    #[test]
    fn test_months_are_thirty_days() {
        assert_eq!(parse_duration(Some("1m")), Duration::days(30));
        assert_eq!(parse_duration(Some("3m")), Duration::days(90));
    }

    #[test]
    fn test_absent_or_empty_defaults_to_one_day() {
        assert_eq!(parse_duration(None), Duration::days(1));
        assert_eq!(parse_duration(Some("")), Duration::days(1));
    }

    #[test]
    fn test_unrecognized_unit_defaults() {
        assert_eq!(parse_duration(Some("3d")), Duration::days(1));
        assert_eq!(parse_duration(Some("10s")), Duration::days(1));
        assert_eq!(parse_duration(Some("forever")), Duration::days(1));
    }

    #[test]
    fn test_zero_and_malformed_amounts_default() {
        assert_eq!(parse_duration(Some("0mins")), Duration::days(1));
        assert_eq!(parse_duration(Some("-5h")), Duration::days(1));
        assert_eq!(parse_duration(Some("1.5h")), Duration::days(1));
    }

    #[test]
    fn test_surrounding_garbage_does_not_match() {
        assert_eq!(parse_duration(Some("about 30mins")), Duration::days(1));
        assert_eq!(parse_duration(Some("30mins please")), Duration::days(1));
        assert_eq!(parse_duration(Some("2hx")), Duration::days(1));
    }

    #[test]
    fn test_overflowing_amount_defaults() {
        let huge = format!("{}m", i64::MAX);
        assert_eq!(parse_duration(Some(&huge)), Duration::days(1));
    }
}
