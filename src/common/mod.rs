pub mod config;
pub mod enums;
pub mod error;
pub mod simple_logging;
pub mod ts;
pub mod utils;
pub use enums::{CandleDirection, Direction};
