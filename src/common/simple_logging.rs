use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// 自定义时间格式
struct CustomTimeFormat;

impl FormatTime for CustomTimeFormat {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// 简化的日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleLoggingConfig {
    pub log_dir: String,
    pub enable_console: bool,
}

impl Default for SimpleLoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            enable_console: true,
        }
    }
}

/// 简化的日志管理器
pub struct SimpleLoggingManager {
    config: SimpleLoggingConfig,
}

impl SimpleLoggingManager {
    pub fn new(config: SimpleLoggingConfig) -> Self {
        Self { config }
    }

    /// 初始化日志系统：main.log / signals.log / web.log 按 target 分流
    pub fn init(&self) -> Result<()> {
        let current_dir = std::env::current_dir()?;
        let log_dir = current_dir.join(&self.config.log_dir);

        if !log_dir.exists() {
            fs::create_dir_all(&log_dir)?;
        }

        let main_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "main.log");
        let signal_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "signals.log");
        let web_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "web.log");

        // 按 target 分离日志
        let main_filter = EnvFilter::new("info")
            .add_directive("signals=off".parse()?)
            .add_directive("web=off".parse()?);

        let signal_filter = EnvFilter::new("off").add_directive("signals=info".parse()?);

        let web_filter = EnvFilter::new("off").add_directive("web=info".parse()?);

        let main_layer = fmt::layer()
            .with_writer(main_appender)
            .with_timer(CustomTimeFormat)
            .with_target(false)
            .with_ansi(false)
            .with_filter(main_filter);

        let signal_layer = fmt::layer()
            .with_writer(signal_appender)
            .with_timer(CustomTimeFormat)
            .with_target(false)
            .with_ansi(false)
            .with_filter(signal_filter);

        let web_layer = fmt::layer()
            .with_writer(web_appender)
            .with_timer(CustomTimeFormat)
            .with_target(false)
            .with_ansi(false)
            .with_filter(web_filter);

        // 控制台输出层（可选）
        let console_layer = if self.config.enable_console {
            Some(
                fmt::layer()
                    .with_timer(CustomTimeFormat)
                    .with_target(false)
                    .with_filter(
                        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                    ),
            )
        } else {
            None
        };

        tracing_subscriber::registry()
            .with(main_layer)
            .with(signal_layer)
            .with(web_layer)
            .with(console_layer)
            .try_init()?;

        info!("🚀 日志系统初始化完成");
        info!("📁 日志目录: {}", self.config.log_dir);
        info!("📋 日志文件: main.log / signals.log / web.log");

        Ok(())
    }
}

/// 交易信号日志（准备、发送）
#[macro_export]
macro_rules! signal_log {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "signals", $($arg)*);
    };
}

/// 控制面 Web 日志
#[macro_export]
macro_rules! web_log {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "web", $($arg)*);
    };
}

/// 系统日志宏
#[macro_export]
macro_rules! system_log {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "system", $($arg)*);
    };
}
