pub mod json_store;
pub mod text_log;
pub use json_store::JsonSignalStore;
pub use text_log::TextSignalLog;
