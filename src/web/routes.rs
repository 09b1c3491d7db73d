use crate::factory::{BotStatus, StartOutcome, StopOutcome};
use crate::models::DispatchRecord;
use crate::web::auth::{clear_session_cookie, session_cookie, verify_credentials, AuthSession};
use crate::web::error::WebError;
use crate::web::state::AppState;
use crate::web_log;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// 控制面 API 路由
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(get_user))
        .route("/api/signals", get(get_signals))
        .route("/api/start_bot", post(start_bot))
        .route("/api/stop_bot", post(stop_bot))
        .route("/api/status", get(bot_status))
        .route("/health", get(health))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/login
pub async fn login(State(state): State<Arc<AppState>>, Json(req): Json<LoginRequest>) -> Result<Response, WebError> {
    if !verify_credentials(&state.config.web.users, &req.username, &req.password) {
        web_log!(warn, "🔒 登录失败: {}", req.username);
        return Err(WebError::InvalidCredentials);
    }

    let token = state.sessions.issue(&req.username, chrono::Utc::now().timestamp());
    let cookie = session_cookie(&token, state.sessions.ttl_secs());
    web_log!(info, "🔓 登录成功: {}", req.username);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(json!({ "success": true, "token": token })),
    )
        .into_response())
}

/// POST /api/logout
pub async fn logout() -> Response {
    ([(SET_COOKIE, clear_session_cookie())], Json(json!({ "success": true }))).into_response()
}

/// GET /api/user
pub async fn get_user(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<Value> {
    let username = state.session_user(&headers).unwrap_or_else(|| "Guest".to_string());
    Json(json!({ "username": username }))
}

/// GET /api/signals — 按插入顺序返回已发送信号
pub async fn get_signals(State(state): State<Arc<AppState>>, _session: AuthSession) -> Json<Vec<DispatchRecord>> {
    match state.store.read_all().await {
        Ok(records) => Json(records),
        Err(e) => {
            web_log!(error, "❌ 读取信号失败: {}", e);
            Json(Vec::new())
        }
    }
}

/// POST /api/start_bot
pub async fn start_bot(State(state): State<Arc<AppState>>, session: AuthSession) -> Result<Json<Value>, WebError> {
    match state.supervisor.start().await {
        Ok(StartOutcome::Started(run_id)) => {
            web_log!(info, "▶️ {} 启动机器人 run_id={}", session.username, run_id);
            Ok(Json(json!({ "message": "Bot started." })))
        }
        Ok(StartOutcome::AlreadyRunning(_)) => Ok(Json(json!({ "message": "Bot is already running." }))),
        Err(e) => {
            web_log!(error, "❌ 启动机器人失败: {}", e);
            Err(WebError::Internal("Failed to start bot.".to_string()))
        }
    }
}

/// POST /api/stop_bot
pub async fn stop_bot(State(state): State<Arc<AppState>>, session: AuthSession) -> Json<Value> {
    match state.supervisor.stop().await {
        StopOutcome::Stopped(run_id) => {
            web_log!(info, "⏹️ {} 停止机器人 run_id={}", session.username, run_id);
            Json(json!({ "message": "Bot stopped." }))
        }
        StopOutcome::NotRunning => Json(json!({ "message": "Bot is not running." })),
    }
}

/// GET /api/status
pub async fn bot_status(State(state): State<Arc<AppState>>, _session: AuthSession) -> Json<BotStatus> {
    Json(state.supervisor.status().await)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::{AppConfig, UserConfig};
    use crate::common::error::BotError;
    use crate::common::utils::sha256_hex;
    use crate::database::JsonSignalStore;
    use crate::factory::{BotSupervisor, SignalBot};
    use crate::models::Signal;
    use crate::common::ts::SignalStore;
    use crate::common::enums::Direction;
    use axum::extract::FromRequestParts;
    use axum::http::{Request, StatusCode};
    use chrono::{Local, TimeZone};

    fn state(dir: &std::path::Path) -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.web.secret_key = "test-secret".to_string();
        config.web.users = vec![UserConfig {
            username: "admin".to_string(),
            password_sha256: sha256_hex("Admin@1220"),
        }];
        let store = Arc::new(JsonSignalStore::new(dir.join("signals.json"), 100));
        // 工厂总是失败，避免测试中真的发起网络请求
        let supervisor = Arc::new(BotSupervisor::new(Arc::new(|| -> Result<SignalBot, BotError> {
            Err(BotError::SampleUnavailable("offline".into()))
        })));
        AppState::new(Arc::new(config), supervisor, store)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_login_success_sets_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let req = LoginRequest {
            username: "admin".to_string(),
            password: "Admin@1220".to_string(),
        };

        let response = login(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_string();
        assert!(cookie.starts_with("session="));

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        let token = body["token"].as_str().unwrap();
        assert_eq!(state.sessions.verify(token, chrono::Utc::now().timestamp()), Some("admin".to_string()));
    }

    #[tokio::test]
    async fn test_login_failure_is_401() {
        let dir = tempfile::tempdir().unwrap();
        let req = LoginRequest {
            username: "admin".to_string(),
            password: "nope".to_string(),
        };
        let response = login(State(state(dir.path())), Json(req)).await.unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn test_user_is_guest_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let Json(body) = get_user(State(state.clone()), HeaderMap::new()).await;
        assert_eq!(body["username"], "Guest");

        let token = state.sessions.issue("admin", chrono::Utc::now().timestamp());
        let mut headers = HeaderMap::new();
        headers.insert("cookie", format!("session={}", token).parse().unwrap());
        let Json(body) = get_user(State(state), headers).await;
        assert_eq!(body["username"], "admin");
    }

    #[tokio::test]
    async fn test_auth_session_extractor() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let (mut parts, _) = Request::builder().uri("/api/signals").body(()).unwrap().into_parts();
        let rejected = AuthSession::from_request_parts(&mut parts, &state).await;
        assert!(matches!(rejected, Err(WebError::Unauthorized)));

        let token = state.sessions.issue("admin", chrono::Utc::now().timestamp());
        let (mut parts, _) = Request::builder()
            .uri("/api/signals")
            .header("authorization", format!("Bearer {}", token))
            .body(())
            .unwrap()
            .into_parts();
        let session = AuthSession::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(session.username, "admin");
    }

    #[tokio::test]
    async fn test_signals_in_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let at = Local.with_ymd_and_hms(2025, 3, 1, 10, 0, 53).unwrap();
        for pair in ["EUR/USD", "GBP/USD"] {
            let record = Signal::new(Direction::Buy, pair, 1.0, at).into_record(at);
            state.store.append(&record).await.unwrap();
        }

        let session = AuthSession { username: "admin".to_string() };
        let Json(records) = get_signals(State(state), session).await;
        let pairs: Vec<&str> = records.iter().map(|r| r.pair.as_str()).collect();
        assert_eq!(pairs, vec!["EUR/USD", "GBP/USD"]);
    }

    #[tokio::test]
    async fn test_stop_when_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let session = AuthSession { username: "admin".to_string() };
        let Json(body) = stop_bot(State(state(dir.path())), session).await;
        assert_eq!(body["message"], "Bot is not running.");
    }

    #[tokio::test]
    async fn test_start_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let session = AuthSession { username: "admin".to_string() };
        let err = start_bot(State(state(dir.path())), session).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Failed to start bot.");
    }
}
