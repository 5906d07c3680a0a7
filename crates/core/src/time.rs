//! Day-relative timestamp normalization.
//!
//! A timestamp is rounded by taking its seconds since midnight in the configured
//! time zone, rounding that to the nearest window (ties go up), and adding the
//! difference back to the absolute timestamp. The result may land on the next
//! day's midnight.

use crate::config::WindowConfig;
use crate::error::{Error, Result};
use crate::types::TimestampSecs;
use chrono::{DateTime, Timelike};
use chrono_tz::Tz;

/// Round `value` to the nearest multiple of `step`, ties rounding up.
///
/// `step` must be positive.
#[inline]
pub fn round_half_up(value: i64, step: i64) -> i64 {
    (2 * value + step).div_euclid(2 * step) * step
}

/// Rounds epoch timestamps to window boundaries anchored at local midnight.
#[derive(Debug, Clone, Copy)]
pub struct TimeNormalizer {
    window_secs: i64,
    tz: Tz,
}

impl TimeNormalizer {
    /// Create a normalizer. `window_secs` must be positive.
    pub fn new(window_secs: i64, tz: Tz) -> Self {
        Self { window_secs, tz }
    }

    /// Create a normalizer from validated window configuration.
    pub fn from_config(config: &WindowConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.window_secs, config.tz()?))
    }

    /// Window size in seconds.
    #[inline]
    pub fn window_secs(&self) -> i64 {
        self.window_secs
    }

    /// Time zone anchoring the day.
    #[inline]
    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Round a timestamp to its nearest window boundary.
    pub fn normalize(&self, ts: TimestampSecs) -> Result<TimestampSecs> {
        let local = self.local(ts)?;
        let secs = i64::from(local.num_seconds_from_midnight());
        Ok(ts + round_half_up(secs, self.window_secs) - secs)
    }

    /// Render a timestamp as `YYYY-MM-DD HH:MM:SS` in the configured time zone.
    pub fn format_local(&self, ts: TimestampSecs) -> Result<String> {
        Ok(self.local(ts)?.format("%Y-%m-%d %H:%M:%S").to_string())
    }

    fn local(&self, ts: TimestampSecs) -> Result<DateTime<Tz>> {
        DateTime::from_timestamp(ts, 0)
            .map(|utc| utc.with_timezone(&self.tz))
            .ok_or_else(|| Error::data(format!("timestamp {} is out of range", ts)))
    }
}
