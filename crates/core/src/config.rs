//! Configuration structures for the tick resampler.

use crate::error::{Error, Result};
use chrono::{NaiveDate, Offset, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Years scanned for UTC offset changes of the configured time zone.
const OFFSET_SCAN_YEARS: (i32, i32) = (2000, 2100);

/// Main configuration for a resampling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window (bucket) configuration.
    pub window: WindowConfig,
    /// Trailing price feature configuration.
    pub trailing: TrailingConfig,
    /// Output table configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check every constant the pipeline consumes.
    pub fn validate(&self) -> Result<()> {
        self.window.validate()?;
        self.trailing.validate()
    }
}

/// Window configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window size in seconds.
    pub window_secs: i64,
    /// IANA time zone whose midnight anchors the rounding (e.g. "UTC", "Europe/Berlin").
    pub timezone: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_secs: 600,
            timezone: "UTC".to_string(),
        }
    }
}

impl WindowConfig {
    /// Validate the window size and time zone.
    pub fn validate(&self) -> Result<()> {
        if self.window_secs <= 0 {
            return Err(Error::config(format!(
                "window_secs must be positive, got {}",
                self.window_secs
            )));
        }
        if SECONDS_PER_DAY % self.window_secs != 0 {
            return Err(Error::config(format!(
                "window_secs must evenly divide a day ({} s), got {}",
                SECONDS_PER_DAY, self.window_secs
            )));
        }
        let tz = self.tz()?;
        if let Some(shift) = misaligned_offset_shift(tz, self.window_secs) {
            return Err(Error::config(format!(
                "window_secs {} does not divide the {} s UTC offset change of time zone '{}'",
                self.window_secs, shift, self.timezone
            )));
        }
        Ok(())
    }

    /// Parse the configured time zone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| Error::config(format!("unknown time zone '{}'", self.timezone)))
    }
}

/// First UTC offset change of `tz` that is not a multiple of `window_secs`.
///
/// Buckets are rounded against local midnight but the series steps by a fixed
/// number of seconds, so every offset the zone takes must sit on the same grid.
/// Offsets are sampled weekly at noon UTC over `OFFSET_SCAN_YEARS`.
fn misaligned_offset_shift(tz: Tz, window_secs: i64) -> Option<i64> {
    let (from, to) = OFFSET_SCAN_YEARS;
    let mut reference: Option<i64> = None;

    for year in from..=to {
        for month in 1..=12 {
            for day in [1, 8, 15, 22] {
                let Some(noon) = NaiveDate::from_ymd_opt(year, month, day)
                    .and_then(|date| date.and_hms_opt(12, 0, 0))
                else {
                    continue;
                };
                let offset = i64::from(tz.offset_from_utc_datetime(&noon).fix().local_minus_utc());
                let base = *reference.get_or_insert(offset);
                if (offset - base) % window_secs != 0 {
                    return Some((offset - base).abs());
                }
            }
        }
    }
    None
}

/// Trailing price feature configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailingConfig {
    /// Number of trailing price columns (N).
    pub count: usize,
    /// Largest row offset looked back (MAX).
    pub max_offset: usize,
}

impl Default for TrailingConfig {
    fn default() -> Self {
        Self {
            count: 10,
            max_offset: 120,
        }
    }
}

impl TrailingConfig {
    /// Validate the feature count and maximum offset.
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::config("trailing count must be at least 1"));
        }
        if self.max_offset == 0 {
            return Err(Error::config("trailing max_offset must be at least 1"));
        }
        Ok(())
    }
}

/// Output table configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// How the TIME column is rendered.
    pub time_format: TimeFormat,
}

/// Rendering of the TIME column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    /// Integer epoch seconds.
    #[default]
    Epoch,
    /// `YYYY-MM-DD HH:MM:SS` in the configured time zone.
    Datetime,
}

impl FromStr for TimeFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "epoch" => Ok(TimeFormat::Epoch),
            "datetime" => Ok(TimeFormat::Datetime),
            other => Err(Error::config(format!(
                "unknown time format '{}' (expected 'epoch' or 'datetime')",
                other
            ))),
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::Epoch => write!(f, "epoch"),
            TimeFormat::Datetime => write!(f, "datetime"),
        }
    }
}
