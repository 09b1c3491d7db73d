pub mod signal_bot_fac;
pub mod supervisor;
pub use signal_bot_fac::{DispatchReport, SignalBot, TickReport};
pub use supervisor::{BotFactory, BotStatus, BotSupervisor, StartOutcome, StopOutcome};
