pub mod signal_scheduler;
pub use signal_scheduler::{SchedulerState, SignalScheduler, TickOutcome};
