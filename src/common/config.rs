use crate::common::error::ConfigError;
use crate::common::simple_logging::SimpleLoggingConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// 信号调度参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// 价格窗口容量
    pub window_capacity: usize,
    /// 通道回看长度
    pub lookback: usize,
    /// 通道缓冲灵敏度
    pub sensitivity: f64,
    /// 两次准备信号之间的冷却时间（秒）
    pub cooldown_secs: u64,
    /// 每分钟的发送秒位
    pub dispatch_second: u32,
    /// 采样间隔（毫秒）
    pub tick_interval_ms: u64,
    /// 取价失败后的退避时间（毫秒）
    pub fetch_backoff_ms: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            window_capacity: 100,
            lookback: 20,
            sensitivity: 1.0,
            cooldown_secs: 120,
            dispatch_second: 53,
            tick_interval_ms: 1000,
            fetch_backoff_ms: 2000,
        }
    }
}

impl BotConfig {
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_secs as i64)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn fetch_backoff(&self) -> Duration {
        Duration::from_millis(self.fetch_backoff_ms)
    }
}

/// 价格来源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 返回 JSON 价格的接口地址
    pub url: String,
    /// 固定交易对名称，设置后忽略响应中的交易对字段
    pub pair: Option<String>,
    pub request_timeout_secs: u64,
    pub price_field: String,
    pub pair_field: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            pair: None,
            request_timeout_secs: 10,
            price_field: "price".to_string(),
            pair_field: "pair".to_string(),
        }
    }
}

/// Telegram 通知配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// 接收消息的会话（私聊 + 群组）
    pub chat_ids: Vec<String>,
    pub timeout_secs: u64,
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_ids: Vec::new(),
            timeout_secs: 10,
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

impl TelegramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 信号存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub json_path: String,
    pub text_log_path: String,
    /// JSON 存储保留的最大条数
    pub retention: usize,
    /// 机器人启动时清空 JSON 存储
    pub clear_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            json_path: "signals.json".to_string(),
            text_log_path: "signals.txt".to_string(),
            retention: 100,
            clear_on_start: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    /// 密码的 SHA-256 十六进制摘要
    pub password_sha256: String,
}

/// 控制面 Web 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
    pub port: u16,
    /// 会话签名密钥
    pub secret_key: String,
    pub session_ttl_secs: u64,
    pub cors_origins: Vec<String>,
    pub users: Vec<UserConfig>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            secret_key: String::new(),
            session_ttl_secs: 12 * 60 * 60,
            cors_origins: Vec::new(),
            users: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub source: SourceConfig,
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
    pub logging: SimpleLoggingConfig,
    pub web: WebConfig,
    pub license: LicenseConfig,
}

impl AppConfig {
    /// 从 TOML 文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // 加载 .env 文件
        dotenv::dotenv().ok();

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从默认路径加载配置
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(config_path)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: AppConfig = toml::from_str(content)?;

        // 替换环境变量
        config.replace_env_vars()?;

        // PORT 环境变量优先（与部署平台约定一致）
        if let Ok(port) = env::var("PORT") {
            config.web.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::ParseError(format!("PORT={}", port)))?;
        }

        Ok(config)
    }

    /// 替换配置中的环境变量
    fn replace_env_vars(&mut self) -> Result<(), ConfigError> {
        self.source.url = replace_env_var(&self.source.url)?;

        self.telegram.bot_token = replace_env_var(&self.telegram.bot_token)?;
        // 会话 ID 中未设置的 ${VAR} 直接跳过（群组可选）
        self.telegram.chat_ids = self
            .telegram
            .chat_ids
            .iter()
            .filter_map(|chat_id| replace_env_var(chat_id).ok())
            .collect();

        self.web.secret_key = replace_env_var(&self.web.secret_key)?;
        for user in &mut self.web.users {
            user.password_sha256 = replace_env_var(&user.password_sha256)?;
        }

        Ok(())
    }

    /// 启动前校验，失败即为致命的配置错误
    pub fn validate(&self, today: NaiveDate) -> Result<(), ConfigError> {
        if let Some(expires_on) = self.license.expires_on {
            if today > expires_on {
                return Err(ConfigError::LicenseExpired(expires_on));
            }
        }

        if self.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::InvalidValue("telegram.bot_token is empty".to_string()));
        }
        if self.telegram.chat_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(ConfigError::InvalidValue("telegram.chat_ids has no destination".to_string()));
        }
        if self.source.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("source.url is empty".to_string()));
        }

        let bot = &self.bot;
        if bot.lookback < 1 {
            return Err(ConfigError::InvalidValue("bot.lookback must be >= 1".to_string()));
        }
        if bot.window_capacity < bot.lookback + 2 {
            return Err(ConfigError::InvalidValue(format!(
                "bot.window_capacity ({}) must be >= lookback + 2 ({})",
                bot.window_capacity,
                bot.lookback + 2
            )));
        }
        // 采样必须每秒至少一次，否则可能永远错过发送秒位
        if bot.tick_interval_ms == 0 || bot.tick_interval_ms > 1000 {
            return Err(ConfigError::InvalidValue(format!(
                "bot.tick_interval_ms ({}) must be within 1..=1000",
                bot.tick_interval_ms
            )));
        }
        if bot.fetch_backoff_ms == 0 {
            return Err(ConfigError::InvalidValue("bot.fetch_backoff_ms must be > 0".to_string()));
        }
        if bot.dispatch_second > 59 {
            return Err(ConfigError::InvalidValue(format!(
                "bot.dispatch_second ({}) must be within 0..=59",
                bot.dispatch_second
            )));
        }
        if self.storage.retention == 0 {
            return Err(ConfigError::InvalidValue("storage.retention must be > 0".to_string()));
        }

        Ok(())
    }

    /// Web 服务额外校验：需要签名密钥
    pub fn validate_web(&self) -> Result<(), ConfigError> {
        if self.web.secret_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue("web.secret_key is empty".to_string()));
        }
        Ok(())
    }
}

/// 替换字符串中的环境变量
fn replace_env_var(s: &str) -> Result<String, ConfigError> {
    if s.starts_with("${") && s.ends_with('}') {
        let var_name = &s[2..s.len() - 1];
        env::var(var_name).map_err(|_| ConfigError::MissingEnvVar(var_name.to_string()))
    } else {
        Ok(s.to_string())
    }
}
