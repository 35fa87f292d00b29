//! Time utilities.
//!
//! Wall-clock helpers, an injectable [`Clock`] so the dispatcher and nonce can be
//! driven deterministically in tests, and parsers for the timestamp encodings
//! exchanges use. Canonical orders carry whole seconds; order books and dispatcher
//! bookkeeping use milliseconds.
//!
//! ```rust
//! use coinbridge_core::time::{Clock, ManualClock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new(0);
//! clock.advance(Duration::from_millis(1500));
//! assert_eq!(clock.now_ms(), 1500);
//! ```

use crate::error::{ParseError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Returns the current time in milliseconds since the Unix epoch.
#[inline]
pub fn milliseconds() -> i64 {
    Utc::now().timestamp_millis()
}

/// Returns the current time in seconds since the Unix epoch.
#[inline]
pub fn seconds() -> i64 {
    Utc::now().timestamp()
}

/// Source of the current time.
pub trait Clock: Send + Sync + Debug {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;

    /// Nanoseconds since the Unix epoch, at the finest resolution available.
    fn now_nanos(&self) -> u64 {
        u64::try_from(self.now_ms()).unwrap_or(0) * 1_000_000
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        milliseconds()
    }

    fn now_nanos(&self) -> u64 {
        Utc::now()
            .timestamp_nanos_opt()
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicI64>,
}

impl ManualClock {
    /// Creates a clock reading `start_ms`.
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    /// Sets the current time.
    pub fn set(&self, ms: i64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let delta = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.now_ms.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Converts milliseconds to whole seconds, dropping the fraction.
#[inline]
pub fn ms_to_seconds(ms: i64) -> i64 {
    ms / 1000
}

/// Parses `"1500000000.123"` style seconds, truncating the fractional part.
///
/// ```rust
/// use coinbridge_core::time::truncate_fractional_seconds;
///
/// assert_eq!(truncate_fractional_seconds("1500000000.987").unwrap(), 1_500_000_000);
/// assert_eq!(truncate_fractional_seconds("1500000000").unwrap(), 1_500_000_000);
/// assert!(truncate_fractional_seconds("15e8").is_err());
/// ```
pub fn truncate_fractional_seconds(value: &str) -> Result<i64> {
    let value = value.trim();
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) {
        return Err(ParseError::timestamp(format!("'{value}' is not a seconds value")).into());
    }
    whole
        .parse::<i64>()
        .map_err(|e| ParseError::timestamp(format!("'{value}': {e}")).into())
}

/// Parses a formatted UTC date-time into seconds since epoch.
///
/// `format` uses `chrono` strftime syntax. Formats with an offset (`%z`) are
/// honored; otherwise the value is taken as UTC. Sub-second digits are dropped.
///
/// ```rust
/// use coinbridge_core::time::parse_datetime_seconds;
///
/// let ts = parse_datetime_seconds("2017-07-14T02:40:00.37", "%Y-%m-%dT%H:%M:%S%.f").unwrap();
/// assert_eq!(ts, 1_500_000_000);
/// ```
pub fn parse_datetime_seconds(value: &str, format: &str) -> Result<i64> {
    let value = value.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
        return Ok(naive.and_utc().timestamp());
    }
    DateTime::parse_from_str(value, format)
        .map(|dt| dt.timestamp())
        .map_err(|e| {
            ParseError::timestamp(format!("'{value}' does not match '{format}': {e}")).into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_recent() {
        let clock = SystemClock;
        assert!(clock.now_ms() > 1_600_000_000_000);
        assert!(clock.now_nanos() > 1_600_000_000_000_000_000);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new(10);
        let other = clock.clone();
        clock.advance(Duration::from_secs(1));
        assert_eq!(other.now_ms(), 1010);
        other.set(5);
        assert_eq!(clock.now_ms(), 5);
        assert_eq!(clock.now_nanos(), 5_000_000);
    }

    #[test]
    fn test_ms_to_seconds_truncates() {
        assert_eq!(ms_to_seconds(1_500_000_000_999), 1_500_000_000);
    }

    #[test]
    fn test_truncate_fractional_seconds_rejects_garbage() {
        assert!(truncate_fractional_seconds("").is_err());
        assert!(truncate_fractional_seconds(".5").is_err());
        assert!(truncate_fractional_seconds("-1.5").is_err());
        assert!(truncate_fractional_seconds("12.3.4").is_err());
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert_eq!(
            parse_datetime_seconds("2017-07-14 02:40:00", "%Y-%m-%d %H:%M:%S").unwrap(),
            1_500_000_000
        );
        assert_eq!(
            parse_datetime_seconds("2017-07-14T04:40:00+0200", "%Y-%m-%dT%H:%M:%S%z").unwrap(),
            1_500_000_000
        );
        assert!(parse_datetime_seconds("14/07/2017", "%Y-%m-%d %H:%M:%S").is_err());
    }
}
