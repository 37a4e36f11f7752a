//! Rolling envelope anomaly detection on log returns
//!
//! Flags returns that fall outside `mean ± threshold * std` of the trailing
//! window of returns that ends at (and includes) the observation itself.

use super::{AnomalyDetector, AnomalyWindowStat, RollingWindow, WindowStat};
use crate::error::{Error, Result};
use crate::features::ReturnPoint;
use serde::{Deserialize, Serialize};

/// Detector settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Number of trailing return points in the rolling window
    pub window: usize,
    /// Envelope half-width in standard deviations
    pub threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window: 20,
            threshold: 2.0,
        }
    }
}

impl DetectorConfig {
    pub fn new(window: usize, threshold: f64) -> Self {
        Self { window, threshold }
    }

    /// Check that the window is positive and the threshold a positive number
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::InvalidConfiguration(
                "window must be a positive integer".to_string(),
            ));
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "threshold must be a positive number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Rolling mean/std envelope detector
///
/// The window is counted in return points. The leading point of a return
/// series has no return: it occupies a slot but contributes nothing to the
/// statistics. An entry is evaluable once the window ending at it is full
/// and its own return is defined; before that its statistics are undefined.
#[derive(Clone, Debug)]
pub struct RollingAnomalyDetector {
    config: DetectorConfig,
}

impl RollingAnomalyDetector {
    /// Create a detector, rejecting out-of-range settings
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create with default parameters (window=20, threshold=2.0)
    pub fn default_params() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl AnomalyDetector for RollingAnomalyDetector {
    fn detect(&self, returns: &[ReturnPoint]) -> Vec<AnomalyWindowStat> {
        let DetectorConfig { window, threshold } = self.config;
        let mut rolling = RollingWindow::new(window);

        let stats: Vec<AnomalyWindowStat> = returns
            .iter()
            .map(|point| {
                rolling.push(point.log_return);

                let stat = match point.log_return {
                    Some(log_return) if rolling.is_full() => {
                        rolling.mean().zip(rolling.sample_std()).map(|(mean, std)| {
                            WindowStat::evaluate(log_return, mean, std, threshold)
                        })
                    }
                    _ => None,
                };

                AnomalyWindowStat {
                    timestamp: point.timestamp,
                    log_return: point.log_return,
                    window: stat,
                }
            })
            .collect();

        if returns.len() < window {
            log::warn!(
                "Only {} return points for a window of {}: no entry is evaluable",
                returns.len(),
                window
            );
        }
        log::debug!(
            "{}: evaluated {} return points (window={}, threshold={})",
            self.name(),
            stats.len(),
            window,
            threshold
        );

        stats
    }

    fn name(&self) -> &str {
        "RollingEnvelope"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Timestamp;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[Option<f64>]) -> Vec<ReturnPoint> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                ReturnPoint::new(Timestamp::from(start + Duration::minutes(5 * i as i64)), r)
            })
            .collect()
    }

    #[test]
    fn test_config_validation() {
        assert!(DetectorConfig::default().validate().is_ok());
        assert!(matches!(
            RollingAnomalyDetector::new(DetectorConfig::new(0, 2.0)),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(RollingAnomalyDetector::new(DetectorConfig::new(20, 0.0)).is_err());
        assert!(RollingAnomalyDetector::new(DetectorConfig::new(20, -1.0)).is_err());
        assert!(RollingAnomalyDetector::new(DetectorConfig::new(20, f64::NAN)).is_err());
    }

    #[test]
    fn test_warm_up_is_undefined() {
        let mut values = vec![None];
        values.extend((1..25).map(|i| Some((i as f64 * 0.7).sin() * 0.001)));
        let detector = RollingAnomalyDetector::new(DetectorConfig::new(20, 2.0)).unwrap();

        let stats = detector.detect(&series(&values));

        assert_eq!(stats.len(), 25);
        assert!(stats[..19].iter().all(|s| !s.is_evaluable()));
        assert!(stats[..19].iter().all(|s| s.is_anomaly().is_none()));
        assert!(stats[19..].iter().all(|s| s.is_evaluable()));
    }

    #[test]
    fn test_statistics_use_window_including_current() {
        let values = [None, Some(1.0), Some(2.0), Some(3.0), Some(10.0)];
        let detector = RollingAnomalyDetector::new(DetectorConfig::new(3, 1.0)).unwrap();

        let stats = detector.detect(&series(&values));
        let last = stats[4].window.unwrap();

        // window holds 2, 3, 10
        assert_relative_eq!(last.rolling_mean, 5.0);
        assert_relative_eq!(last.rolling_std, (19.0f64).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(last.upper_bound, 5.0 + (19.0f64).sqrt(), epsilon = 1e-12);
        assert!(last.is_anomaly);
    }

    #[test]
    fn test_zero_std_flags_any_deviation() {
        let values = [None, Some(0.0), Some(0.0), Some(0.0)];
        let detector = RollingAnomalyDetector::new(DetectorConfig::new(3, 2.0)).unwrap();

        let stats = detector.detect(&series(&values));
        let last = stats[3].window.unwrap();
        assert_eq!(last.rolling_std, 0.0);
        assert_eq!(last.upper_bound, last.lower_bound);
        assert!(!last.is_anomaly);

        let stat = WindowStat::evaluate(0.01, 0.0, 0.0, 2.0);
        assert!(stat.is_anomaly);
    }

    #[test]
    fn test_short_series_has_no_evaluable_entries() {
        let detector = RollingAnomalyDetector::default_params();
        let stats = detector.detect(&series(&[None, Some(0.01), Some(-0.02)]));

        assert_eq!(stats.len(), 3);
        assert!(stats.iter().all(|s| s.window.is_none()));
    }

    #[test]
    fn test_constant_nonzero_returns_are_not_flagged() {
        let detector = RollingAnomalyDetector::new(DetectorConfig::new(20, 2.0)).unwrap();
        assert_eq!(detector.name(), "RollingEnvelope");

        for v in [0.01, 0.001, 0.07, 0.1] {
            let mut values = vec![None];
            values.extend(std::iter::repeat(Some(v)).take(199));

            let stats = detector.detect(&series(&values));
            let evaluable: Vec<_> = stats.iter().filter_map(|s| s.window).collect();

            assert_eq!(evaluable.len(), 181);
            assert!(evaluable.iter().all(|w| w.rolling_std == 0.0 && w.rolling_mean == v));
            assert!(evaluable.iter().all(|w| !w.is_anomaly));
        }
    }

    #[test]
    fn test_empty_input() {
        let detector = RollingAnomalyDetector::default_params();
        assert!(detector.detect(&[]).is_empty());
    }
}
