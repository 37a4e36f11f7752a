//! Reporting timezone policy
//!
//! Anomaly timestamps are reported in one fixed civil timezone, US Eastern
//! unless configured otherwise. A timestamp without timezone information is
//! assumed to be in UTC before conversion; a timestamp with an offset is
//! converted as is. Nothing is inferred from the host's local timezone.

use crate::data::Timestamp;
use crate::error::{Error, Result};
use chrono::DateTime;
use chrono_tz::Tz;

/// Timezone anomalies are reported in by default
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Layout used when printing reported timestamps
pub const REPORT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Look up an IANA timezone name such as "America/New_York"
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| Error::UnknownTimezone(name.to_string()))
}

/// Express a timestamp in the reporting timezone.
///
/// Naive timestamps are taken to be UTC.
pub fn normalize(timestamp: &Timestamp, zone: Tz) -> DateTime<Tz> {
    timestamp.to_utc().with_timezone(&zone)
}

/// Format a reported timestamp, e.g. "2024-01-02 09:30:00"
pub fn format_local(local: &DateTime<Tz>) -> String {
    local.format(REPORT_FORMAT).to_string()
}
