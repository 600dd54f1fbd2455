// Clock and locale-aware display formatting

use chrono::{DateTime, Duration, FixedOffset, Local, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock pinned to a preset instant, advanced by hand
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    /// Build from milliseconds since epoch, interpreted in UTC-3 (Brasília)
    pub fn from_millis(millis: i64) -> Self {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap_or(Utc.fix());
        let instant = DateTime::from_timestamp_millis(millis)
            .unwrap_or_default()
            .with_timezone(&offset);
        Self::new(instant)
    }

    pub fn advance(&self, by: Duration) {
        let mut instant = self.instant.lock().unwrap_or_else(|e| e.into_inner());
        *instant += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.instant.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Display conventions for dates, times, and user-facing text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Locale {
    /// Brazilian Portuguese: 17/10/2026, 14:05:09
    #[default]
    #[serde(rename = "pt-br")]
    PtBr,
    /// US English: 10/17/2026, 2:05:09 PM
    #[serde(rename = "en-us")]
    EnUs,
}

impl Locale {
    pub fn format_date(self, instant: &DateTime<FixedOffset>) -> String {
        match self {
            Locale::PtBr => instant.format("%d/%m/%Y").to_string(),
            Locale::EnUs => instant.format("%-m/%-d/%Y").to_string(),
        }
    }

    pub fn format_time(self, instant: &DateTime<FixedOffset>) -> String {
        match self {
            Locale::PtBr => instant.format("%H:%M:%S").to_string(),
            Locale::EnUs => instant.format("%-I:%M:%S %p").to_string(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::PtBr => write!(f, "pt-br"),
            Locale::EnUs => write!(f, "en-us"),
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "pt-br" | "pt" => Ok(Locale::PtBr),
            "en-us" | "en" => Ok(Locale::EnUs),
            other => Err(format!("unsupported locale: {} (expected pt-br or en-us)", other)),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Milliseconds since epoch for an instant
pub fn millis(instant: &DateTime<FixedOffset>) -> i64 {
    instant.timestamp_millis()
}
