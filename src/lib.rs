//! Log-Return Anomaly Indicator
//!
//! Flags abnormal intraday price moves by comparing each log return with a
//! rolling mean ± k·std envelope of the trailing window that ends at it.
//! The output is a statistical reading of the market, not a trading
//! strategy.
//!
//! # Modules
//!
//! - `data`: Price series, timestamps, Yahoo Finance and CSV input
//! - `features`: Log return series
//! - `anomaly`: Rolling envelope detector and anomaly queries
//! - `timezone`: Reporting timezone policy (naive timestamps are UTC)
//! - `chart`: Payload for an external chart renderer
//! - `analysis`: End-to-end pipeline, sequential or across instruments
//! - `config`: TOML configuration
//!
//! # Example
//!
//! ```no_run
//! use rust_return_anomaly::anomaly::{last_anomalies, AnomalyDetector, RollingAnomalyDetector};
//! use rust_return_anomaly::data::YahooClient;
//! use rust_return_anomaly::features::build;
//! use rust_return_anomaly::timezone::DEFAULT_TIMEZONE;
//!
//! let client = YahooClient::new().unwrap();
//! let series = client.fetch("^GSPC", "5m", "5d").unwrap();
//!
//! let returns = build(&series.data).unwrap();
//! let stats = RollingAnomalyDetector::default_params().detect(&returns);
//! let recent = last_anomalies(&stats, 5, DEFAULT_TIMEZONE);
//! ```

pub mod analysis;
pub mod anomaly;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod timezone;

pub use analysis::*;
pub use anomaly::*;
pub use chart::*;
pub use config::*;
pub use data::*;
pub use error::{Error, Result};
pub use features::*;
