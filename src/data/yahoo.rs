//! Yahoo Finance data loading for intraday closes.
//!
//! Fetches bars from the Yahoo Finance chart endpoint. Failures are always
//! returned as errors: an unknown symbol or an empty answer must never look
//! like a quiet market to the caller.

use super::{PricePoint, PriceSeries, Timestamp};
use crate::error::{Error, Result};
use chrono::{TimeZone, Utc};
use serde::Deserialize;

/// Default bar size requested from the provider
pub const DEFAULT_INTERVAL: &str = "5m";
/// Default lookback requested from the provider
pub const DEFAULT_RANGE: &str = "5d";

/// Yahoo Finance API response
#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    // Absent when the range holds no bars
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance client
pub struct YahooClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YahooClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Result<Self> {
        Ok(Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            client: reqwest::blocking::Client::builder()
                .user_agent("Mozilla/5.0")
                .build()?,
        })
    }

    /// Point the client at another host serving the same chart API
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch closing prices
    ///
    /// # Arguments
    /// * `symbol` - Ticker (e.g., "^GSPC", "EURJPY=X")
    /// * `interval` - Bar size ("1m", "5m", "1h", ...)
    /// * `range` - Lookback ("1d", "5d", "1mo", ...)
    ///
    /// # Example
    /// ```rust,ignore
    /// let client = YahooClient::new()?;
    /// let series = client.fetch("^GSPC", "5m", "5d")?;
    /// ```
    pub fn fetch(&self, symbol: &str, interval: &str, range: &str) -> Result<PriceSeries> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        log::info!("Fetching Yahoo data for {} ({} bars, {} range)", symbol, interval, range);

        let response = self
            .client
            .get(&url)
            .query(&[("interval", interval), ("range", range)])
            .send()?;

        let status = response.status();
        let body = response.text()?;

        let series = parse_chart(symbol, interval, &body).map_err(|err| match err {
            Error::Json(_) if !status.is_success() => Error::Acquisition {
                symbol: symbol.to_string(),
                reason: format!("HTTP {}", status),
            },
            other => other,
        })?;

        log::info!("Fetched {} bars for {}", series.len(), symbol);

        Ok(series)
    }
}

/// Decode a chart endpoint body into a price series.
///
/// Null closes are kept as missing prices; cleaning them is the return
/// builder's job.
pub fn parse_chart(symbol: &str, interval: &str, body: &str) -> Result<PriceSeries> {
    let acquisition = |reason: String| Error::Acquisition {
        symbol: symbol.to_string(),
        reason,
    };

    let response: YahooResponse = serde_json::from_str(body)?;

    if let Some(error) = response.chart.error {
        return Err(acquisition(format!("{} - {}", error.code, error.description)));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| acquisition("empty result array".to_string()))?;

    let timestamps = result
        .timestamp
        .filter(|t| !t.is_empty())
        .ok_or_else(|| acquisition("no bars in the requested range".to_string()))?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| acquisition("no quote data".to_string()))?;

    let mut data = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(instant) = Utc.timestamp_opt(ts, 0).single() else {
            log::warn!("Skipping bar with out-of-range epoch {} for {}", ts, symbol);
            continue;
        };

        data.push(PricePoint {
            timestamp: Timestamp::from(instant),
            close: quote.close.get(i).copied().flatten(),
        });
    }

    Ok(PriceSeries::with_data(
        symbol.to_string(),
        interval.to_string(),
        data,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "^GSPC", "exchangeTimezoneName": "America/New_York"},
                "timestamp": [1704205800, 1704206100, 1704206400],
                "indicators": {"quote": [{
                    "open": [4745.2, 4741.0, null],
                    "close": [4741.1, null, 4739.9]
                }]}
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_keeps_null_closes() {
        let series = parse_chart("^GSPC", "5m", BODY).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.valid_count(), 2);
        assert_eq!(series.data[1].close, None);
        assert!(!series.data[0].timestamp.is_naive());
        assert_eq!(series.data[0].timestamp.to_string(), "2024-01-02T14:30:00+00:00");
    }

    #[test]
    fn test_parse_chart_unknown_symbol() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;

        let err = parse_chart("NOPE", "5m", body).unwrap_err();
        assert!(err.is_acquisition_failure());
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn test_parse_chart_empty_range() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;

        assert!(matches!(
            parse_chart("^NDX", "5m", body),
            Err(Error::Acquisition { .. })
        ));
    }

    // Requires network access
    #[test]
    #[ignore]
    fn test_fetch_yahoo_data() {
        let client = YahooClient::new().unwrap();
        let series = client.fetch("^GSPC", DEFAULT_INTERVAL, DEFAULT_RANGE).unwrap();
        assert!(!series.is_empty());
    }
}
