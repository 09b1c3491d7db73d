pub mod price_sample;
pub mod signal;
pub use price_sample::{PriceQuote, PriceSample};
pub use signal::{DispatchRecord, Signal};
pub use crate::common::enums::{CandleDirection, Direction};
