//! Sliding window accumulator
//!
//! Keeps a running sum and sum of squares over the last `capacity` slots so
//! that mean and variance update in O(1) per step. Values are accumulated as
//! deviations from a reference value taken from the window, so a window of
//! identical values has a mean equal to that value and a variance of exactly
//! zero.

use std::collections::VecDeque;

/// Fixed-size trailing window over optional observations.
///
/// A `None` slot takes up a position in the window but contributes nothing
/// to the statistics.
#[derive(Clone, Debug)]
pub struct RollingWindow {
    /// Number of slots in a full window
    capacity: usize,
    /// Most recent slots, oldest first
    slots: VecDeque<Option<f64>>,
    /// Reference value the sums are taken relative to
    shift: f64,
    /// Running sum of `value - shift` over defined values
    sum: f64,
    /// Running sum of `(value - shift)^2` over defined values
    sum_sq: f64,
    /// Number of defined values in the window
    count: usize,
    /// Most recent defined value
    last: Option<f64>,
    /// Trailing defined values equal to `last`, capped at `count`
    run: usize,
    /// Evictions since the sums were last recomputed
    evictions: usize,
}

impl RollingWindow {
    /// Create an empty window with `capacity` slots
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: VecDeque::with_capacity(capacity),
            shift: 0.0,
            sum: 0.0,
            sum_sq: 0.0,
            count: 0,
            last: None,
            run: 0,
            evictions: 0,
        }
    }

    /// Clear the window state
    pub fn reset(&mut self) {
        *self = Self::new(self.capacity);
    }

    /// Number of slots in a full window
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether every slot of the window is occupied
    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.slots.len() == self.capacity
    }

    /// Number of defined values in the window
    pub fn count(&self) -> usize {
        self.count
    }

    /// Slide the window forward by one slot
    pub fn push(&mut self, value: Option<f64>) {
        if self.capacity == 0 {
            return;
        }

        if self.slots.len() == self.capacity {
            if let Some(Some(old)) = self.slots.pop_front() {
                let d = old - self.shift;
                self.sum -= d;
                self.sum_sq -= d * d;
                self.count -= 1;
                self.run = self.run.min(self.count);
            }
            self.evictions += 1;
        }

        self.slots.push_back(value);
        if let Some(v) = value {
            self.run = if self.last == Some(v) { self.run + 1 } else { 1 };
            self.last = Some(v);

            let d = v - self.shift;
            self.sum += d;
            self.sum_sq += d * d;
            self.count += 1;
        }

        if self.count == 0 {
            self.sum = 0.0;
            self.sum_sq = 0.0;
            self.run = 0;
        } else if self.count == 1 || self.evictions >= self.capacity {
            // Re-summed once per full turn of the window to bound drift
            self.resum();
        } else if self.run == self.count && self.last != Some(self.shift) {
            // Window just turned constant: re-anchor on its value
            self.resum();
        }
    }

    /// Mean of the defined values
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.shift + self.sum / self.count as f64)
        }
    }

    /// Sample standard deviation (N - 1 denominator) of the defined values.
    ///
    /// A single value has a standard deviation of zero.
    pub fn sample_std(&self) -> Option<f64> {
        match self.count {
            0 => None,
            1 => Some(0.0),
            n => {
                let n = n as f64;
                let variance = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
                Some(variance.max(0.0).sqrt())
            }
        }
    }

    /// Recompute the sums, anchored on the oldest defined value
    fn resum(&mut self) {
        self.shift = self.slots.iter().flatten().next().copied().unwrap_or(0.0);
        let shift = self.shift;
        let (sum, sum_sq) = self
            .slots
            .iter()
            .flatten()
            .map(|&v| v - shift)
            .fold((0.0, 0.0), |(s, sq), d| (s + d, sq + d * d));
        self.sum = sum;
        self.sum_sq = sum_sq;
        self.evictions = 0;
    }
}
