use crate::common::config::UserConfig;
use crate::common::utils::{constant_time_eq, generate_hmac_signature, sha256_hex};
use crate::web::error::WebError;
use crate::web::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "session";

// 允许的时钟偏差（秒）
const CLOCK_SKEW_SECS: i64 = 60;

/// 无状态会话：`<username>.<issued_at>.<hmac>`
#[derive(Debug, Clone)]
pub struct SessionSigner {
    secret: String,
    ttl_secs: i64,
}

impl SessionSigner {
    pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs: ttl_secs as i64,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub fn issue(&self, username: &str, now: i64) -> String {
        let payload = format!("{}.{}", username, now);
        let signature = generate_hmac_signature(&payload, &self.secret);
        format!("{}.{}", payload, signature)
    }

    /// 校验签名与有效期，返回用户名
    pub fn verify(&self, token: &str, now: i64) -> Option<String> {
        let (payload, signature) = token.rsplit_once('.')?;
        let expected = generate_hmac_signature(payload, &self.secret);
        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            return None;
        }

        let (username, issued_at) = payload.rsplit_once('.')?;
        let issued_at: i64 = issued_at.parse().ok()?;
        if username.is_empty() || issued_at > now + CLOCK_SKEW_SECS || now - issued_at > self.ttl_secs {
            return None;
        }
        Some(username.to_string())
    }
}

/// 用户名 + 密码校验（密码以 SHA-256 摘要配置）
pub fn verify_credentials(users: &[UserConfig], username: &str, password: &str) -> bool {
    let digest = sha256_hex(password);
    users
        .iter()
        .find(|user| user.username == username)
        .map(|user| constant_time_eq(digest.as_bytes(), user.password_sha256.trim().to_lowercase().as_bytes()))
        .unwrap_or(false)
}

/// 从 `Authorization: Bearer` 或 `session` cookie 取出会话令牌
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; Secure; SameSite=None; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0", SESSION_COOKIE)
}

/// 已登录会话提取器，未登录时返回 401
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub username: String,
}

impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        state
            .session_user(&parts.headers)
            .map(|username| AuthSession { username })
            .ok_or(WebError::Unauthorized)
    }
}
