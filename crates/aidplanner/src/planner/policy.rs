//! Scheduling policy: horizon, grid, buffer and duration cap.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Longest booking horizon accepted from configuration.
pub const MAX_HORIZON_DAYS: u32 = 366;

/// The rules every booked session must follow.
///
/// Defaults give a 14-day horizon, a 30-minute grid, a one-hour gap between
/// sessions and a five-hour cap on a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulePolicy {
    /// How many days after today may be booked.
    pub horizon_days: u32,
    /// Grid spacing for start times and durations.
    pub slot_minutes: u32,
    /// Minimum gap between the end of one session and the start of another.
    pub buffer_minutes: u32,
    /// Longest bookable session.
    pub max_session_minutes: u32,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            horizon_days: 14,
            slot_minutes: 30,
            buffer_minutes: 60,
            max_session_minutes: 300,
        }
    }
}

impl SchedulePolicy {
    /// Check that the policy describes a usable grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.slot_minutes == 0 || MINUTES_PER_DAY % self.slot_minutes != 0 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "slot_minutes ({}) must be positive and divide a day evenly",
                    self.slot_minutes
                ),
            });
        }

        if self.max_session_minutes == 0
            || self.max_session_minutes % self.slot_minutes != 0
            || self.max_session_minutes > MINUTES_PER_DAY
        {
            return Err(Error::ConfigValidation {
                message: format!(
                    "max_session_minutes ({}) must be a positive multiple of slot_minutes ({}) \
                     and at most {MINUTES_PER_DAY}",
                    self.max_session_minutes, self.slot_minutes
                ),
            });
        }

        if self.horizon_days == 0 || self.horizon_days > MAX_HORIZON_DAYS {
            return Err(Error::ConfigValidation {
                message: format!(
                    "horizon_days ({}) must be between 1 and {MAX_HORIZON_DAYS}",
                    self.horizon_days
                ),
            });
        }

        if self.buffer_minutes > MINUTES_PER_DAY {
            return Err(Error::ConfigValidation {
                message: format!(
                    "buffer_minutes ({}) must be at most {MINUTES_PER_DAY}",
                    self.buffer_minutes
                ),
            });
        }

        Ok(())
    }

    /// Grid spacing as a duration.
    #[must_use]
    pub fn slot(&self) -> Duration {
        Duration::minutes(i64::from(self.slot_minutes))
    }

    /// Required gap as a duration.
    #[must_use]
    pub fn buffer(&self) -> Duration {
        Duration::minutes(i64::from(self.buffer_minutes))
    }

    /// Number of grid points in one day.
    #[must_use]
    pub fn slots_per_day(&self) -> u32 {
        MINUTES_PER_DAY / self.slot_minutes
    }

    /// Number of grid steps in the longest session.
    #[must_use]
    pub fn max_steps(&self) -> u32 {
        self.max_session_minutes / self.slot_minutes
    }

    /// Whether a timestamp sits exactly on the grid.
    #[must_use]
    pub fn is_on_grid(&self, timestamp: NaiveDateTime) -> bool {
        timestamp.second() == 0
            && timestamp.nanosecond() == 0
            && (timestamp.hour() * 60 + timestamp.minute()) % self.slot_minutes == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::parse_storage;

    #[test]
    fn test_default_policy() {
        let policy = SchedulePolicy::default();
        assert_eq!(policy.horizon_days, 14);
        assert_eq!(policy.slot_minutes, 30);
        assert_eq!(policy.buffer_minutes, 60);
        assert_eq!(policy.max_session_minutes, 300);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_derived_values() {
        let policy = SchedulePolicy::default();
        assert_eq!(policy.slots_per_day(), 48);
        assert_eq!(policy.max_steps(), 10);
        assert_eq!(policy.buffer(), Duration::hours(1));
    }

    #[test]
    fn test_validate_slot_not_dividing_day() {
        let policy = SchedulePolicy {
            slot_minutes: 7,
            ..SchedulePolicy::default()
        };
        let err = policy.validate().unwrap_err().to_string();
        assert!(err.contains("slot_minutes"));
    }

    #[test]
    fn test_validate_zero_slot() {
        let policy = SchedulePolicy {
            slot_minutes: 0,
            ..SchedulePolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_validate_max_session_off_grid() {
        let policy = SchedulePolicy {
            max_session_minutes: 100,
            ..SchedulePolicy::default()
        };
        let err = policy.validate().unwrap_err().to_string();
        assert!(err.contains("max_session_minutes"));
    }

    #[test]
    fn test_validate_zero_horizon() {
        let policy = SchedulePolicy {
            horizon_days: 0,
            ..SchedulePolicy::default()
        };
        let err = policy.validate().unwrap_err().to_string();
        assert!(err.contains("horizon_days"));
    }

    #[test]
    fn test_validate_rejects_oversized_values() {
        let horizon = SchedulePolicy {
            horizon_days: u32::MAX,
            ..SchedulePolicy::default()
        };
        let err = horizon.validate().unwrap_err().to_string();
        assert!(err.contains("horizon_days"));

        let session = SchedulePolicy {
            max_session_minutes: 30 * 100_000,
            ..SchedulePolicy::default()
        };
        let err = session.validate().unwrap_err().to_string();
        assert!(err.contains("max_session_minutes"));

        let buffer = SchedulePolicy {
            buffer_minutes: u32::MAX,
            ..SchedulePolicy::default()
        };
        let err = buffer.validate().unwrap_err().to_string();
        assert!(err.contains("buffer_minutes"));
    }

    #[test]
    fn test_validate_accepts_upper_bounds() {
        let policy = SchedulePolicy {
            horizon_days: MAX_HORIZON_DAYS,
            slot_minutes: 30,
            buffer_minutes: MINUTES_PER_DAY,
            max_session_minutes: MINUTES_PER_DAY,
        };
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_is_on_grid() {
        let policy = SchedulePolicy::default();
        assert!(policy.is_on_grid(parse_storage("2024-03-10 09:00").unwrap()));
        assert!(policy.is_on_grid(parse_storage("2024-03-10 09:30").unwrap()));
        assert!(!policy.is_on_grid(parse_storage("2024-03-10 09:15").unwrap()));
        assert!(!policy.is_on_grid(parse_storage("2024-03-10 09:59").unwrap()));
    }
}
