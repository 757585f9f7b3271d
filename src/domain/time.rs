//! Calendar and clock primitives
//!
//! The clinic API exchanges dates as `YYYY-MM-DD` and times as `HH:MM` in the
//! clinic's local time, with no offset. These types keep that wire shape while
//! giving the scheduling rules minute arithmetic to work with.

use chrono::{NaiveDate, NaiveTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use super::errors::SchedulingError;

const MINUTES_PER_DAY: u32 = 24 * 60;

fn hhmm_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").unwrap())
}

/// Time of day with minute granularity
///
/// Ordered by minutes since midnight. Displays and serializes as zero-padded
/// 24-hour `HH:MM`.
///
/// # Examples
///
/// ```
/// use slotwise::domain::time::ClockTime;
///
/// let t: ClockTime = "9:30".parse().unwrap();
/// assert_eq!(t.to_string(), "09:30");
/// assert_eq!(t.minutes(), 570);
/// assert!("24:00".parse::<ClockTime>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Build from hour and minute, `None` when out of range
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    /// Build from minutes since midnight, `None` past 23:59
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        if minutes < MINUTES_PER_DAY {
            Some(Self(minutes as u16))
        } else {
            None
        }
    }

    /// Parse a manually entered time, validating 24-hour `HH:MM`
    pub fn parse_manual(input: &str) -> Result<Self, SchedulingError> {
        let trimmed = input.trim();
        let caps = hhmm_pattern()
            .captures(trimmed)
            .ok_or_else(|| SchedulingError::InvalidTime(input.to_string()))?;
        let hour: u32 = caps[1]
            .parse()
            .map_err(|_| SchedulingError::InvalidTime(input.to_string()))?;
        let minute: u32 = caps[2]
            .parse()
            .map_err(|_| SchedulingError::InvalidTime(input.to_string()))?;
        Self::from_hm(hour, minute).ok_or_else(|| SchedulingError::InvalidTime(input.to_string()))
    }

    /// Minutes since midnight
    pub fn minutes(&self) -> u32 {
        u32::from(self.0)
    }

    pub fn hour(&self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(&self) -> u32 {
        self.minutes() % 60
    }

    /// End of an interval starting here, in minutes since midnight
    ///
    /// May exceed one day; intervals are compared numerically and never wrap.
    /// Saturates at `u32::MAX` for durations read from untrusted data.
    pub fn end_minutes(&self, duration_minutes: u32) -> u32 {
        self.minutes().saturating_add(duration_minutes)
    }

    /// Convert to a chrono time
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_manual(s)
    }
}

impl Serialize for ClockTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Format a date as the `YYYY-MM-DD` key used for grouping and on the wire
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(input: &str) -> Result<NaiveDate, SchedulingError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| SchedulingError::InvalidDate(input.to_string()))
}

/// Allowed appointment lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum AppointmentDuration {
    Minutes15,
    Minutes20,
    Minutes30,
    Minutes45,
    Minutes60,
}

impl AppointmentDuration {
    /// Every allowed duration, shortest first
    pub const ALL: [AppointmentDuration; 5] = [
        AppointmentDuration::Minutes15,
        AppointmentDuration::Minutes20,
        AppointmentDuration::Minutes30,
        AppointmentDuration::Minutes45,
        AppointmentDuration::Minutes60,
    ];

    pub fn minutes(&self) -> u32 {
        match self {
            AppointmentDuration::Minutes15 => 15,
            AppointmentDuration::Minutes20 => 20,
            AppointmentDuration::Minutes30 => 30,
            AppointmentDuration::Minutes45 => 45,
            AppointmentDuration::Minutes60 => 60,
        }
    }
}

impl Default for AppointmentDuration {
    fn default() -> Self {
        AppointmentDuration::Minutes30
    }
}

impl TryFrom<u32> for AppointmentDuration {
    type Error = SchedulingError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|d| d.minutes() == minutes)
            .ok_or(SchedulingError::InvalidDuration(minutes))
    }
}

impl From<AppointmentDuration> for u32 {
    fn from(duration: AppointmentDuration) -> Self {
        duration.minutes()
    }
}

impl fmt::Display for AppointmentDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.minutes())
    }
}
