pub mod channel_breakout;
pub mod rolling_window;
pub use channel_breakout::{detect, ChannelBreakoutStrategy};
pub use rolling_window::RollingWindow;
