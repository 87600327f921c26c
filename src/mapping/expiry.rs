//! Document expiry encoding.
//!
//! The store interprets an expiry of up to 30 days (inclusive) as a relative
//! TTL in seconds. Anything longer must be sent as an absolute Unix timestamp.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Largest expiry, in seconds, that is still sent as a relative TTL.
pub const TTL_IN_SECONDS_INCLUSIVE_END: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl ExpiryUnit {
    pub fn to_seconds(self, amount: u64) -> u64 {
        match self {
            ExpiryUnit::Seconds => amount,
            ExpiryUnit::Minutes => amount.saturating_mul(60),
            ExpiryUnit::Hours => amount.saturating_mul(60 * 60),
            ExpiryUnit::Days => amount.saturating_mul(24 * 60 * 60),
        }
    }
}

/// Expiry as it is handed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Seconds from now. `Relative(0)` means the document never expires.
    Relative(u32),
    /// Seconds since the Unix epoch, UTC.
    Absolute(u32),
}

impl Expiry {
    pub const NONE: Expiry = Expiry::Relative(0);

    /// Encode an expiry of `amount` `unit`s, measured from `now`.
    pub fn from_shift(amount: u64, unit: ExpiryUnit, now: DateTime<Utc>) -> Expiry {
        let seconds = unit.to_seconds(amount);
        if seconds <= TTL_IN_SECONDS_INCLUSIVE_END {
            return Expiry::Relative(seconds as u32);
        }

        // days are added as whole days so no resolution is lost
        let shift = match unit {
            ExpiryUnit::Days => i64::try_from(amount).ok().and_then(Duration::try_days),
            _ => i64::try_from(seconds).ok().and_then(Duration::try_seconds),
        };
        let at = shift
            .and_then(|shift| now.checked_add_signed(shift))
            .map(|at| at.timestamp())
            .unwrap_or(i64::MAX);
        Expiry::Absolute(u32::try_from(at).unwrap_or(u32::MAX))
    }

    /// The raw value understood by the store.
    pub fn as_raw(&self) -> u32 {
        match self {
            Expiry::Relative(secs) | Expiry::Absolute(secs) => *secs,
        }
    }

    pub fn is_none(&self) -> bool {
        self.as_raw() == 0
    }

    /// Point in time at which a document stored with the raw expiry `raw` at `now` expires.
    pub fn deadline(raw: u32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if raw == 0 {
            None
        } else if u64::from(raw) <= TTL_IN_SECONDS_INCLUSIVE_END {
            Some(now + Duration::seconds(i64::from(raw)))
        } else {
            DateTime::from_timestamp(i64::from(raw), 0)
        }
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiry::Relative(secs) => write!(f, "ttl {}s", secs),
            Expiry::Absolute(ts) => write!(f, "at {}", ts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_boundary_is_relative() {
        let expiry = Expiry::from_shift(2_592_000, ExpiryUnit::Seconds, now());
        assert_eq!(expiry, Expiry::Relative(2_592_000));
    }

    #[test]
    fn test_past_boundary_is_absolute() {
        let expiry = Expiry::from_shift(2_592_001, ExpiryUnit::Seconds, now());
        assert_eq!(
            expiry,
            Expiry::Absolute((now().timestamp() + 2_592_001) as u32)
        );
    }

    #[test]
    fn test_thirty_days_still_relative() {
        assert_eq!(
            Expiry::from_shift(30, ExpiryUnit::Days, now()),
            Expiry::Relative(30 * 24 * 60 * 60)
        );
    }

    #[test]
    fn test_thirty_one_days_absolute() {
        let expected = now() + Duration::days(31);
        assert_eq!(
            Expiry::from_shift(31, ExpiryUnit::Days, now()),
            Expiry::Absolute(expected.timestamp() as u32)
        );
    }

    #[test]
    fn test_huge_amount_saturates_into_the_future() {
        for unit in [ExpiryUnit::Seconds, ExpiryUnit::Hours, ExpiryUnit::Days] {
            let expiry = Expiry::from_shift(u64::MAX, unit, now());
            assert_eq!(expiry, Expiry::Absolute(u32::MAX));
            let deadline = Expiry::deadline(expiry.as_raw(), now()).unwrap();
            assert!(deadline > now());
        }
    }

    #[test]
    fn test_zero_means_no_expiry() {
        let expiry = Expiry::from_shift(0, ExpiryUnit::Hours, now());
        assert!(expiry.is_none());
        assert_eq!(Expiry::deadline(0, now()), None);
    }

    #[test]
    fn test_deadline() {
        assert_eq!(
            Expiry::deadline(10, now()),
            Some(now() + Duration::seconds(10))
        );
        let absolute = (now().timestamp() + 3_000_000) as u32;
        assert_eq!(
            Expiry::deadline(absolute, now()).map(|d| d.timestamp()),
            Some(i64::from(absolute))
        );
    }
}
