//! Chart payload for an external renderer
//!
//! The indicator draws nothing itself. It hands a renderer the full return
//! series with its envelope, the anomalous points, and the annotation for
//! the most recent anomaly.

use crate::anomaly::{Anomaly, AnomalyWindowStat, Direction};
use crate::error::Result;
use crate::timezone;
use chrono::SecondsFormat;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Vertical distance between an annotated point and its label
pub const LABEL_OFFSET: f64 = 0.002;

/// One timestamp of the plotted series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// UTC instant in RFC 3339
    pub timestamp: String,
    pub log_return: Option<f64>,
    pub upper_bound: Option<f64>,
    pub lower_bound: Option<f64>,
    pub is_anomaly: Option<bool>,
}

impl From<&AnomalyWindowStat> for ChartPoint {
    fn from(stat: &AnomalyWindowStat) -> Self {
        Self {
            timestamp: stat
                .timestamp
                .to_utc()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            log_return: stat.log_return,
            upper_bound: stat.upper_bound(),
            lower_bound: stat.lower_bound(),
            is_anomaly: stat.is_anomaly(),
        }
    }
}

/// Label placed on the most recent anomaly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// UTC instant in RFC 3339, on the same axis as the series
    pub timestamp: String,
    /// Same instant in the reporting timezone
    pub local_time: String,
    pub log_return: f64,
    pub direction: Direction,
    pub text: String,
    /// Where the label text sits; the arrow points at `log_return`
    pub text_y: f64,
}

impl Annotation {
    pub fn for_anomaly(anomaly: &Anomaly, threshold: f64) -> Self {
        Self {
            timestamp: anomaly
                .timestamp
                .to_utc()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            local_time: timezone::format_local(&anomaly.local_time),
            log_return: anomaly.log_return,
            direction: anomaly.direction,
            text: label_text(anomaly.direction, threshold),
            text_y: anomaly.log_return + LABEL_OFFSET,
        }
    }
}

/// Annotation wording for an anomaly on the given side of the envelope
pub fn label_text(direction: Direction, threshold: f64) -> String {
    format!(
        "Log return {} {} standard deviations\nLook for a possible correction",
        direction, threshold
    )
}

/// Everything a renderer needs to draw one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Timezone of `Annotation::local_time`
    pub timezone: String,
    pub points: Vec<ChartPoint>,
    pub anomalies: Vec<ChartPoint>,
    pub annotation: Option<Annotation>,
}

impl ChartData {
    /// Assemble the payload from a detection result and its latest anomaly
    pub fn build(
        name: &str,
        symbol: &str,
        stats: &[AnomalyWindowStat],
        latest: Option<&Anomaly>,
        threshold: f64,
        zone: Tz,
    ) -> Self {
        let points: Vec<ChartPoint> = stats.iter().map(ChartPoint::from).collect();
        let anomalies = points
            .iter()
            .filter(|p| p.is_anomaly == Some(true))
            .cloned()
            .collect();

        Self {
            title: format!("Log Return Anomalies - {} ({})", name, symbol),
            x_label: "Date".to_string(),
            y_label: "Log Return".to_string(),
            timezone: zone.name().to_string(),
            points,
            anomalies,
            annotation: latest.map(|a| Annotation::for_anomaly(a, threshold)),
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON payload to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
