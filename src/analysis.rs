//! End-to-end analysis of one price series
//!
//! Runs returns → rolling envelope → recent anomalies → chart payload.
//! Each analysis is independent, so several instruments can be processed
//! in parallel without coordination.

use crate::anomaly::{
    last_anomalies, Anomaly, AnomalyDetector, AnomalyWindowStat, DetectionSummary,
    RollingAnomalyDetector,
};
use crate::chart::ChartData;
use crate::config::Config;
use crate::data::PriceSeries;
use crate::error::Result;
use crate::features::{build, ReturnPoint};
use rayon::prelude::*;

/// Result of analyzing one instrument
#[derive(Debug, Clone)]
pub struct Analysis {
    pub symbol: String,
    pub returns: Vec<ReturnPoint>,
    pub stats: Vec<AnomalyWindowStat>,
    pub summary: DetectionSummary,
    /// Most recent anomalies, oldest first, in the reporting timezone
    pub recent: Vec<Anomaly>,
    pub chart: ChartData,
}

impl Analysis {
    /// The most recent anomaly, if any
    pub fn latest(&self) -> Option<&Anomaly> {
        self.recent.last()
    }
}

/// Analyze one series; `name` is only used for the chart title
pub fn analyze(series: &PriceSeries, name: &str, config: &Config) -> Result<Analysis> {
    let detector = RollingAnomalyDetector::new(config.detector)?;
    let zone = config.report_timezone()?;

    let returns = build(&series.data)?;
    let stats = detector.detect(&returns);
    let summary = DetectionSummary::from_stats(&stats);
    let mut recent = last_anomalies(&stats, config.report.last.max(1), zone);

    let chart = ChartData::build(
        name,
        &series.symbol,
        &stats,
        recent.last(),
        config.detector.threshold,
        zone,
    );

    // The chart always gets the latest anomaly, the listing gets `last`
    let keep_from = recent.len().saturating_sub(config.report.last);
    recent.drain(..keep_from);

    log::info!(
        "{}: {} anomalies in {} evaluable of {} return points",
        series.symbol,
        summary.anomalies,
        summary.evaluable,
        summary.total
    );

    Ok(Analysis {
        symbol: series.symbol.clone(),
        returns,
        stats,
        summary,
        recent,
        chart,
    })
}

/// Analyze several series in parallel, one result per input in input order
pub fn analyze_many(series: &[PriceSeries], config: &Config) -> Vec<Result<Analysis>> {
    series
        .par_iter()
        .map(|s| analyze(s, &s.symbol, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::Direction;
    use crate::data::PricePoint;
    use crate::error::Error;
    use chrono::{Duration, TimeZone, Utc};

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        PriceSeries::with_data(
            symbol.to_string(),
            "5m".to_string(),
            closes
                .iter()
                .enumerate()
                .map(|(i, &c)| PricePoint::new(start + Duration::minutes(5 * i as i64), c))
                .collect(),
        )
    }

    fn jump_series() -> Vec<f64> {
        let mut closes = vec![100.0; 19];
        closes.push(130.0);
        closes
    }

    #[test]
    fn test_analyze_flags_jump() {
        let analysis =
            analyze(&series("^GSPC", &jump_series()), "S&P 500", &Config::default()).unwrap();

        assert_eq!(analysis.summary.anomalies, 1);
        assert_eq!(analysis.recent.len(), 1);
        let latest = analysis.latest().unwrap();
        assert_eq!(latest.index, 19);
        assert_eq!(latest.direction, Direction::Above);
        assert!(analysis.chart.annotation.is_some());
    }

    #[test]
    fn test_zero_last_still_annotates() {
        let mut config = Config::default();
        config.report.last = 0;

        let analysis = analyze(&series("^GSPC", &jump_series()), "S&P 500", &config).unwrap();
        assert!(analysis.recent.is_empty());
        assert!(analysis.chart.annotation.is_some());
    }

    #[test]
    fn test_analyze_rejects_bad_config() {
        let mut config = Config::default();
        config.detector.window = 0;

        assert!(matches!(
            analyze(&series("^NDX", &jump_series()), "NASDAQ 100", &config),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_analyze_many_keeps_order() {
        let inputs = vec![
            series("^GSPC", &jump_series()),
            series("^NDX", &[100.0]),
            series("EURJPY=X", &[160.0; 30]),
        ];

        let results = analyze_many(&inputs, &Config::default());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().symbol, "^GSPC");
        assert!(matches!(results[1], Err(Error::InsufficientData { .. })));
        assert_eq!(results[2].as_ref().unwrap().summary.anomalies, 0);
    }
}
