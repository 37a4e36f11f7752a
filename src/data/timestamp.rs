//! Observation timestamps
//!
//! Market data arrives either with an explicit UTC offset (provider epochs,
//! RFC 3339 text) or as a bare civil date-time. The two are kept apart so
//! that the reporting layer can apply an explicit policy to the bare ones
//! instead of silently guessing: a naive timestamp is taken to be UTC.

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layouts accepted for timestamps without timezone information
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Point in time of a price observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Timestamp {
    /// Civil date-time with no timezone information
    Naive(NaiveDateTime),
    /// Date-time with an explicit UTC offset
    Aware(DateTime<FixedOffset>),
}

impl Timestamp {
    /// Parse RFC 3339 text (aware) or `YYYY-MM-DD[T ]HH:MM:SS[.fff]` (naive)
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Timestamp::Aware(dt));
        }
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%z") {
            return Ok(Timestamp::Aware(dt));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(Timestamp::Naive)
            .ok_or_else(|| Error::Timestamp(s.to_string()))
    }

    /// Whether the timestamp lacks timezone information
    pub fn is_naive(&self) -> bool {
        matches!(self, Timestamp::Naive(_))
    }

    /// The instant this timestamp denotes.
    ///
    /// Naive timestamps are assumed to already be in UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Timestamp::Naive(naive) => Utc.from_utc_datetime(naive),
            Timestamp::Aware(dt) => dt.with_timezone(&Utc),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
            Timestamp::Aware(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Timestamp::parse(s)
    }
}

impl TryFrom<String> for Timestamp {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Timestamp::parse(&s)
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_string()
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(naive: NaiveDateTime) -> Self {
        Timestamp::Naive(naive)
    }
}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Timestamp::Aware(dt)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Aware(dt.fixed_offset())
    }
}
