//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping              GET   存活检查
//! - /api/health            GET   合成引擎健康检查
//! - /api/tts/synthesize    POST  合成语音，返回音频
//! - /api/voice/list        GET   列出所有音色

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/health", get(handlers::health))
        .nest("/tts", tts_routes())
        .nest("/voice", voice_routes())
}

/// TTS 路由
fn tts_routes() -> Router<Arc<AppState>> {
    Router::new().route("/synthesize", post(handlers::synthesize))
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new().route("/list", get(handlers::list_voices))
}
