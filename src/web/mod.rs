pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use crate::common::config::WebConfig;
use crate::web_log;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use state::AppState;

/// 组装完整的控制面路由
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.web);
    Router::new()
        .merge(routes::routes())
        .layer(cors)
        .with_state(state)
}

/// 仅允许配置中的前端来源携带凭证访问
fn cors_layer(web: &WebConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = web
        .cors_origins
        .iter()
        .filter_map(|origin| origin.trim().trim_end_matches('/').parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

/// 启动 HTTP 服务，直到 `shutdown` 完成
pub async fn serve<F>(state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let web = &state.config.web;
    let addr: SocketAddr = format!("{}:{}", web.bind, web.port).parse()?;
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    web_log!(info, "🌐 控制面监听 http://{}", addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
