//! Log return series
//!
//! Turns a closing price series into close-to-close log returns.
//! Missing prices are dropped before differencing, never interpolated.

use crate::data::{PricePoint, Timestamp};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Minimum number of valid prices needed for one return
pub const MIN_PRICES: usize = 2;

/// Log return at one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub timestamp: Timestamp,
    /// `None` for the first point of a series, which has no prior price
    pub log_return: Option<f64>,
}

impl ReturnPoint {
    pub fn new(timestamp: Timestamp, log_return: Option<f64>) -> Self {
        Self {
            timestamp,
            log_return,
        }
    }
}

/// Build the log return series of a price series.
///
/// Points with a missing price are removed first; the first remaining point
/// gets an undefined return and every later point gets
/// `ln(price[i] / price[i - 1])` against the previous remaining price.
///
/// # Errors
/// * `InsufficientData` if fewer than two valid prices remain
/// * `InvalidPrice` for a zero or negative price
/// * `Unordered` if the remaining timestamps do not strictly increase
pub fn build(prices: &[PricePoint]) -> Result<Vec<ReturnPoint>> {
    let cleaned: Vec<(Timestamp, f64)> = prices
        .iter()
        .filter_map(|p| p.valid_close().map(|close| (p.timestamp, close)))
        .collect();

    let dropped = prices.len() - cleaned.len();
    if dropped > 0 {
        log::warn!("Dropped {} of {} bars with a missing price", dropped, prices.len());
    }

    if cleaned.len() < MIN_PRICES {
        return Err(Error::InsufficientData {
            valid: cleaned.len(),
            required: MIN_PRICES,
        });
    }

    if let Some(&(timestamp, price)) = cleaned.iter().find(|(_, price)| *price <= 0.0) {
        return Err(Error::InvalidPrice {
            timestamp: timestamp.to_string(),
            price,
        });
    }

    if let Some(pair) = cleaned
        .windows(2)
        .find(|w| w[1].0.to_utc() <= w[0].0.to_utc())
    {
        return Err(Error::Unordered {
            previous: pair[0].0.to_string(),
            current: pair[1].0.to_string(),
        });
    }

    let mut returns = Vec::with_capacity(cleaned.len());
    returns.push(ReturnPoint::new(cleaned[0].0, None));

    returns.extend(
        cleaned
            .windows(2)
            .map(|w| ReturnPoint::new(w[1].0, Some((w[1].1 / w[0].1).ln()))),
    );

    log::debug!("Built {} return points from {} bars", returns.len(), prices.len());

    Ok(returns)
}
