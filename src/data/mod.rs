//! Price data: timestamps, closing price series, acquisition and CSV input

mod instruments;
mod prices;
mod timestamp;
mod yahoo;

pub use instruments::*;
pub use prices::*;
pub use timestamp::*;
pub use yahoo::*;
