//! Progress-adjustment policy and the simulcast "mark watched" rule.

use chrono::{Duration, NaiveDate};

use crate::error::{Error, Result};
use crate::models::MAX_PROGRESS;

const SIMULCAST_DATE_FORMAT: &str = "%Y-%m-%d";
const DAYS_BETWEEN_RELEASES: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressChange {
    Increment(u32),
    Decrement(u32),
    Reset,
}

/// New progress value for `current` after `change`, clamped to `[0, 100]`.
///
/// Decrementing from 0 (or below) is refused rather than clamped.
pub fn apply(current: i32, change: ProgressChange) -> Result<i32> {
    match change {
        ProgressChange::Increment(d) => {
            let next = i64::from(current) + i64::from(d);
            Ok(next.min(i64::from(MAX_PROGRESS)) as i32)
        }
        ProgressChange::Decrement(_) if current <= 0 => {
            Err(Error::Local("Progress is already at 0".into()))
        }
        ProgressChange::Decrement(d) => {
            let next = i64::from(current) - i64::from(d);
            Ok(next.max(0) as i32)
        }
        ProgressChange::Reset => Ok(0),
    }
}

/// Date of the next release, one week after `date`. `None` when `date`
/// does not parse, in which case the stored value is left alone.
pub fn next_release(date: &str) -> Option<String> {
    let parsed = NaiveDate::parse_from_str(date.trim(), SIMULCAST_DATE_FORMAT).ok()?;
    let next = parsed.checked_add_signed(Duration::days(DAYS_BETWEEN_RELEASES))?;
    Some(next.format(SIMULCAST_DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_clamps_at_100() {
        assert_eq!(apply(95, ProgressChange::Increment(10)).unwrap(), 100);
        assert_eq!(apply(100, ProgressChange::Increment(1)).unwrap(), 100);
        assert_eq!(apply(40, ProgressChange::Increment(10)).unwrap(), 50);
        assert_eq!(apply(0, ProgressChange::Increment(u32::MAX)).unwrap(), 100);
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        assert_eq!(apply(5, ProgressChange::Decrement(10)).unwrap(), 0);
        assert_eq!(apply(50, ProgressChange::Decrement(1)).unwrap(), 49);
    }

    #[test]
    fn test_decrement_at_zero_is_rejected() {
        assert!(matches!(apply(0, ProgressChange::Decrement(1)), Err(Error::Local(_))));
        assert!(apply(-3, ProgressChange::Decrement(1)).is_err());
    }

    #[test]
    fn test_reset() {
        for current in [0, 1, 57, 100] {
            assert_eq!(apply(current, ProgressChange::Reset).unwrap(), 0);
        }
    }

    #[test]
    fn test_next_release() {
        assert_eq!(next_release("2024-01-01").as_deref(), Some("2024-01-08"));
        assert_eq!(next_release("2024-02-26").as_deref(), Some("2024-03-04"));
        assert_eq!(next_release("2023-12-28").as_deref(), Some("2024-01-04"));
        assert_eq!(next_release("next tuesday"), None);
        assert_eq!(next_release(""), None);
    }
}
