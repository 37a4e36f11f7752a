//! Closing price series
//!
//! Core data structures for the raw input of the indicator: one closing
//! price per bar, possibly missing.

use super::Timestamp;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Single closing price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: Timestamp,
    /// `None` when the provider reported no price for the bar
    pub close: Option<f64>,
}

impl PricePoint {
    /// Create a price point with a known close
    pub fn new(timestamp: impl Into<Timestamp>, close: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            close: Some(close),
        }
    }

    /// Create a price point whose close is missing
    pub fn missing(timestamp: impl Into<Timestamp>) -> Self {
        Self {
            timestamp: timestamp.into(),
            close: None,
        }
    }

    /// The close, unless it is missing or not a finite number
    pub fn valid_close(&self) -> Option<f64> {
        self.close.filter(|c| c.is_finite())
    }
}

/// Series of closing prices for one instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub interval: String,
    pub data: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create an empty series
    pub fn new(symbol: String, interval: String) -> Self {
        Self {
            symbol,
            interval,
            data: Vec::new(),
        }
    }

    /// Create a series with data
    pub fn with_data(symbol: String, interval: String, data: Vec<PricePoint>) -> Self {
        Self {
            symbol,
            interval,
            data,
        }
    }

    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the number of bars
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Number of bars carrying a usable close
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|p| p.valid_close().is_some()).count()
    }

    /// Get all closes, missing ones included
    pub fn closes(&self) -> Vec<Option<f64>> {
        self.data.iter().map(|p| p.close).collect()
    }

    /// Get all timestamps
    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.data.iter().map(|p| p.timestamp).collect()
    }

    /// Get the latest bar
    pub fn latest(&self) -> Option<&PricePoint> {
        self.data.last()
    }

    /// Append a new bar
    pub fn push(&mut self, point: PricePoint) {
        self.data.push(point);
    }

    /// Get the last n bars
    pub fn tail(&self, n: usize) -> PriceSeries {
        let start = self.data.len().saturating_sub(n);

        PriceSeries {
            symbol: self.symbol.clone(),
            interval: self.interval.clone(),
            data: self.data[start..].to_vec(),
        }
    }

    /// Save to CSV file
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(["timestamp", "close"])?;

        for point in &self.data {
            writer.write_record([
                point.timestamp.to_string(),
                point.close.map(|c| c.to_string()).unwrap_or_default(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load from CSV file with `timestamp,close` columns.
    ///
    /// An empty close cell is read as a missing price.
    pub fn from_csv<P: AsRef<Path>>(path: P, symbol: &str, interval: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut data = Vec::new();

        for (row, result) in reader.records().enumerate() {
            let record = result?;

            let timestamp = Timestamp::parse(record.get(0).unwrap_or_default())?;
            let close = match record.get(1).map(str::trim) {
                None | Some("") => None,
                Some(text) => Some(text.parse::<f64>().map_err(|e| {
                    Error::Parse(format!("row {}: close {:?}: {}", row + 1, text, e))
                })?),
            };

            data.push(PricePoint { timestamp, close });
        }

        log::debug!("Loaded {} bars for {} from CSV", data.len(), symbol);

        Ok(Self::with_data(symbol.to_string(), interval.to_string(), data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn ts(minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 2, 14, minute, 0).unwrap().into()
    }

    #[test]
    fn test_valid_close_filters_non_finite() {
        assert_eq!(PricePoint::new(ts(0), 100.0).valid_close(), Some(100.0));
        assert_eq!(PricePoint::new(ts(0), f64::NAN).valid_close(), None);
        assert_eq!(PricePoint::missing(ts(0)).valid_close(), None);
    }

    #[test]
    fn test_series_counts() {
        let series = PriceSeries::with_data(
            "^GSPC".to_string(),
            "5m".to_string(),
            vec![
                PricePoint::new(ts(0), 100.0),
                PricePoint::missing(ts(5)),
                PricePoint::new(ts(10), 101.0),
            ],
        );

        assert_eq!(series.len(), 3);
        assert_eq!(series.valid_count(), 2);
        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.latest().and_then(|p| p.close), Some(101.0));
    }

    #[test]
    fn test_csv_round_trip_keeps_missing_and_naive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        std::fs::write(
            &path,
            "timestamp,close\n2024-01-02 14:30:00,100.5\n2024-01-02 14:35:00,\n2024-01-02T14:40:00+00:00,101\n",
        )
        .unwrap();

        let series = PriceSeries::from_csv(&path, "^NDX", "5m").unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.data[0].timestamp.is_naive());
        assert_eq!(series.data[1].close, None);
        assert!(!series.data[2].timestamp.is_naive());

        let out = dir.path().join("out.csv");
        series.to_csv(&out).unwrap();
        let reloaded = PriceSeries::from_csv(&out, "^NDX", "5m").unwrap();
        assert_eq!(reloaded.data, series.data);
    }

    #[test]
    fn test_csv_bad_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "timestamp,close\n2024-01-02 14:30:00,abc\n").unwrap();

        assert!(matches!(
            PriceSeries::from_csv(&path, "X", "5m"),
            Err(Error::Parse(_))
        ));
    }
}
