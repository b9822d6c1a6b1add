//! Expiration policy driven by user configuration.
//!
//! cardbox ships no interval table of its own. [`ConfiguredSchedule`] takes
//! the table from [`crate::config::CardboxConfig`]: `interval_days[n]` is how
//! many days a card stays learned after reaching level `n + 1`. Levels beyond
//! the table reuse its last entry.
//!
//! With `fixed_expiration_hour` set, due times snap to that hour (UTC) on the
//! due day, so a whole day's reviews come due together instead of trickling
//! in at the minute each card was last tested.
//!
//! Intervals are capped at [`MAX_INTERVAL_DAYS`] (100 years).

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::error::{CardboxError, Result};
use crate::review::ExpirationPolicy;

/// Longest interval a schedule accepts.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredSchedule {
    interval_days: Vec<u32>,
    fixed_hour: Option<u32>,
}

impl ConfiguredSchedule {
    pub fn new(interval_days: Vec<u32>, fixed_hour: Option<u32>) -> Result<Self> {
        if interval_days.is_empty() {
            return Err(CardboxError::Schedule(
                "interval_days must list at least one interval".to_string(),
            ));
        }
        if interval_days.contains(&0) {
            return Err(CardboxError::Schedule(
                "interval_days entries must be at least one day".to_string(),
            ));
        }
        if let Some(days) = interval_days.iter().find(|days| **days > MAX_INTERVAL_DAYS) {
            return Err(CardboxError::Schedule(format!(
                "interval_days entries must be at most {} days, got {}",
                MAX_INTERVAL_DAYS, days
            )));
        }
        if let Some(hour) = fixed_hour {
            if hour > 23 {
                return Err(CardboxError::Schedule(format!(
                    "fixed_expiration_hour must be between 0 and 23, got {}",
                    hour
                )));
            }
        }
        Ok(Self {
            interval_days,
            fixed_hour,
        })
    }

    pub fn interval_days(&self) -> &[u32] {
        &self.interval_days
    }

    /// Days a card stays learned once it reaches `level`.
    pub fn days_for(&self, level: u32) -> u32 {
        let last = self.interval_days.len() - 1;
        let index = (level.max(1) as usize - 1).min(last);
        self.interval_days[index]
    }
}

impl ExpirationPolicy for ConfiguredSchedule {
    /// Clamps to the latest representable instant rather than overflowing.
    fn expiration_for(&self, level: u32, tested_at: DateTime<Utc>) -> DateTime<Utc> {
        let due = tested_at
            .checked_add_signed(Duration::days(i64::from(self.days_for(level))))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        match self
            .fixed_hour
            .and_then(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        {
            Some(time) => due.date_naive().and_time(time).and_utc(),
            None => due,
        }
    }
}
