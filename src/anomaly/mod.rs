//! Anomaly detection on log returns
//!
//! This module provides:
//! - A sliding window accumulator for O(1) rolling mean and variance
//! - The rolling envelope detector
//! - Queries over detection results (most recent anomalies, direction)

mod rolling;
mod window;

pub use rolling::*;
pub use window::*;

use crate::data::Timestamp;
use crate::features::ReturnPoint;
use crate::timezone;
use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rolling statistics of one evaluable return
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowStat {
    pub rolling_mean: f64,
    pub rolling_std: f64,
    pub upper_bound: f64,
    pub lower_bound: f64,
    pub is_anomaly: bool,
}

impl WindowStat {
    /// Place a return against the envelope of its own window.
    ///
    /// Comparisons are strict, so a return sitting exactly on a bound is
    /// not anomalous. A zero std collapses both bounds onto the mean.
    pub fn evaluate(log_return: f64, mean: f64, std: f64, threshold: f64) -> Self {
        let upper_bound = mean + threshold * std;
        let lower_bound = mean - threshold * std;

        Self {
            rolling_mean: mean,
            rolling_std: std,
            upper_bound,
            lower_bound,
            is_anomaly: log_return > upper_bound || log_return < lower_bound,
        }
    }
}

/// Detection result for one return point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyWindowStat {
    pub timestamp: Timestamp,
    pub log_return: Option<f64>,
    /// `None` while the point cannot be evaluated (warm-up, undefined return)
    pub window: Option<WindowStat>,
}

impl AnomalyWindowStat {
    pub fn is_evaluable(&self) -> bool {
        self.window.is_some()
    }

    /// `None` when the point is not evaluable, which is not the same as "normal"
    pub fn is_anomaly(&self) -> Option<bool> {
        self.window.map(|w| w.is_anomaly)
    }

    pub fn rolling_mean(&self) -> Option<f64> {
        self.window.map(|w| w.rolling_mean)
    }

    pub fn rolling_std(&self) -> Option<f64> {
        self.window.map(|w| w.rolling_std)
    }

    pub fn upper_bound(&self) -> Option<f64> {
        self.window.map(|w| w.upper_bound)
    }

    pub fn lower_bound(&self) -> Option<f64> {
        self.window.map(|w| w.lower_bound)
    }

    /// Side of the envelope an anomalous return broke through
    pub fn direction(&self) -> Option<Direction> {
        match (self.log_return, self.window) {
            (Some(log_return), Some(w)) if w.is_anomaly => {
                Some(Direction::of(log_return, w.upper_bound))
            }
            _ => None,
        }
    }
}

/// Side of the envelope an anomaly lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    /// Strictly above the upper bound is `Above`; any other anomaly must
    /// have broken the lower bound.
    pub fn of(log_return: f64, upper_bound: f64) -> Self {
        if log_return > upper_bound {
            Direction::Above
        } else {
            Direction::Below
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Above => write!(f, "above"),
            Direction::Below => write!(f, "below"),
        }
    }
}

/// An anomalous return, with its timestamp in the reporting timezone
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    /// Position in the detection result
    pub index: usize,
    /// Timestamp as received
    pub timestamp: Timestamp,
    /// Timestamp in the reporting timezone
    pub local_time: DateTime<Tz>,
    pub log_return: f64,
    pub stat: WindowStat,
    pub direction: Direction,
}

impl Anomaly {
    fn from_stat(index: usize, stat: &AnomalyWindowStat, zone: Tz) -> Option<Self> {
        let direction = stat.direction()?;

        Some(Self {
            index,
            timestamp: stat.timestamp,
            local_time: timezone::normalize(&stat.timestamp, zone),
            log_return: stat.log_return?,
            stat: stat.window?,
            direction,
        })
    }
}

/// Trait for detectors over a return series
pub trait AnomalyDetector {
    /// One result per return point, in input order
    fn detect(&self, returns: &[ReturnPoint]) -> Vec<AnomalyWindowStat>;

    /// Get the name of the detector
    fn name(&self) -> &str;
}

/// Up to `k` most recent anomalies, oldest first.
///
/// Returns fewer than `k` (possibly none) when fewer exist. Timestamps are
/// normalized to `zone`, naive ones being taken as UTC.
pub fn last_anomalies(stats: &[AnomalyWindowStat], k: usize, zone: Tz) -> Vec<Anomaly> {
    let mut recent: Vec<Anomaly> = stats
        .iter()
        .enumerate()
        .rev()
        .filter_map(|(i, stat)| Anomaly::from_stat(i, stat, zone))
        .take(k)
        .collect();

    recent.reverse();
    recent
}

/// The most recent anomaly, if any
pub fn latest_anomaly(stats: &[AnomalyWindowStat], zone: Tz) -> Option<Anomaly> {
    last_anomalies(stats, 1, zone).pop()
}

/// Aggregate counts over a detection result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    /// Number of return points
    pub total: usize,
    /// Points with defined rolling statistics
    pub evaluable: usize,
    pub anomalies: usize,
}

impl DetectionSummary {
    pub fn from_stats(stats: &[AnomalyWindowStat]) -> Self {
        Self {
            total: stats.len(),
            evaluable: stats.iter().filter(|s| s.is_evaluable()).count(),
            anomalies: stats.iter().filter(|s| s.is_anomaly() == Some(true)).count(),
        }
    }

    /// Share of evaluable points flagged as anomalous
    pub fn anomaly_rate(&self) -> f64 {
        if self.evaluable == 0 {
            0.0
        } else {
            self.anomalies as f64 / self.evaluable as f64
        }
    }
}
