use crate::common::config::AppConfig;
use crate::common::ts::SignalStore;
use crate::factory::BotSupervisor;
use crate::web::auth::{session_token, SessionSigner};
use axum::http::HeaderMap;
use std::sync::Arc;

/// 路由共享状态，通过 `axum::extract::State` 传给所有处理函数
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub supervisor: Arc<BotSupervisor>,
    pub sessions: SessionSigner,
    pub store: Arc<dyn SignalStore>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, supervisor: Arc<BotSupervisor>, store: Arc<dyn SignalStore>) -> Arc<Self> {
        let sessions = SessionSigner::new(config.web.secret_key.clone(), config.web.session_ttl_secs);
        Arc::new(Self {
            config,
            supervisor,
            sessions,
            store,
        })
    }

    /// 当前请求的登录用户
    pub fn session_user(&self, headers: &HeaderMap) -> Option<String> {
        let token = session_token(headers)?;
        self.sessions.verify(&token, chrono::Utc::now().timestamp())
    }
}
