//! 独立运行信号机器人（不经过控制面）。

use channel_signal_bot::{
    common::{config::AppConfig, simple_logging::SimpleLoggingManager},
    factory::SignalBot,
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ 配置加载失败: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate(chrono::Local::now().date_naive()) {
        eprintln!("❌ 配置无效: {}", e);
        std::process::exit(1);
    }

    SimpleLoggingManager::new(config.logging.clone()).init()?;

    let bot = SignalBot::from_config_with_json_store(&config)?;

    tokio::select! {
        _ = bot.run() => {}
        _ = signal::ctrl_c() => {
            tracing::info!("🚩 机器人已手动停止");
        }
    }

    Ok(())
}
