use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to read configuration file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("License expired on {0}")]
    LicenseExpired(chrono::NaiveDate),
}

/// 信号机器人运行期错误
///
/// 除 `Configuration` 外都是可恢复错误：调度循环只记录日志，不会因此退出。
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Price sample unavailable: {0}")]
    SampleUnavailable(String),

    #[error("Notification to {destination} failed: {reason}")]
    NotificationFailure { destination: String, reason: String },

    #[error("Notification to {destination} timed out after {secs}s")]
    NotificationTimeout { destination: String, secs: u64 },

    #[error("Failed to persist signal: {0}")]
    PersistenceFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl BotError {
    /// 是否为可恢复错误（循环内吞掉即可）
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BotError::Configuration(_))
    }
}
