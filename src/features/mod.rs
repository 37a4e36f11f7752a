//! Feature engineering module for anomaly detection
//!
//! Derives the return series the detectors work on from raw prices.

mod returns;

pub use returns::*;
