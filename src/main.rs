//! 控制面服务入口：登录、启动/停止信号机器人、查询已发送信号。

use channel_signal_bot::{
    common::{config::AppConfig, simple_logging::SimpleLoggingManager, ts::SignalStore},
    database::JsonSignalStore,
    factory::{BotFactory, BotSupervisor, SignalBot},
    web::{self, AppState},
};
use std::sync::Arc;
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

    // 配置错误是致命的：在任何循环启动前退出
    if let Err(e) = config
        .validate(chrono::Local::now().date_naive())
        .and_then(|_| config.validate_web())
    {
        eprintln!("❌ 配置无效: {}", e);
        std::process::exit(1);
    }

    SimpleLoggingManager::new(config.logging.clone()).init()?;

    let config = Arc::new(config);
    let store: Arc<dyn SignalStore> = Arc::new(JsonSignalStore::new(
        &config.storage.json_path,
        config.storage.retention,
    ));

    let factory: BotFactory = {
        let config = config.clone();
        let store = store.clone();
        Arc::new(move || SignalBot::from_config(&config, store.clone()))
    };
    let supervisor = Arc::new(BotSupervisor::new(factory));
    let state = AppState::new(config.clone(), supervisor.clone(), store);

    web::serve(state, async {
        let _ = signal::ctrl_c().await;
        tracing::info!("🛑 收到停止信号，正在关闭服务...");
    })
    .await?;

    // 服务退出时一并停止后台机器人
    supervisor.stop().await;
    tracing::info!("✅ 服务已停止");
    Ok(())
}
