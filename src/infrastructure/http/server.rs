//! HTTP Server
//!
//! Axum HTTP 服务器启动和配置

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;
use crate::config::ServerConfig;

/// 请求体上限（合成请求只有 JSON 文本）
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 构建带中间件的 Router
pub fn build_router(state: Arc<AppState>) -> Router {
    // CORS 配置 - 允许所有来源的跨域请求，暴露合成元数据响应头
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    create_routes()
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(error_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let router = build_router(self.state.clone());
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::application::{SpeechPerformer, SynthesisLimits};
    use crate::infrastructure::adapters::tts::FakeSynthesizer;
    use crate::infrastructure::http::dto::headers;

    fn test_router() -> Router {
        let performer = SpeechPerformer::new(
            Arc::new(FakeSynthesizer::with_defaults()),
            SynthesisLimits::default(),
        );
        build_router(Arc::new(AppState::new(performer, "fake")))
    }

    fn synthesize_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/tts/synthesize")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let response = test_router()
            .oneshot(Request::builder().uri("/api/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_synthesize_returns_wav_with_metadata() {
        let response = test_router()
            .oneshot(synthesize_request(
                r#"{"text": "Hello world", "voice": "en_us", "speed": 1.0}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "audio/wav");
        assert_eq!(response.headers()[headers::SAMPLE_RATE], "22050");
        assert_eq!(response.headers()[headers::DURATION_MS], "660");
        assert!(response.headers().contains_key(headers::REQUEST_ID));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn test_synthesize_uses_default_voice_and_speed() {
        let response = test_router()
            .oneshot(synthesize_request(r#"{"text": "Hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_synthesize_empty_text_is_bad_request() {
        let response = test_router()
            .oneshot(synthesize_request(r#"{"text": "  ", "voice": "en_us"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["errno"], 400);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_synthesize_unknown_voice_is_not_found() {
        let response = test_router()
            .oneshot(synthesize_request(r#"{"text": "Hello", "voice": "nobody"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["errno"], 404);
    }

    #[tokio::test]
    async fn test_synthesize_bad_speed_is_bad_request() {
        let response = test_router()
            .oneshot(synthesize_request(r#"{"text": "Hello", "speed": 0}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_synthesize_malformed_body_uses_error_envelope() {
        let response = test_router()
            .oneshot(synthesize_request(r#"{"voice": "en_us"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["errno"], 400);
        assert!(body["error"].as_str().unwrap().contains("text"));

        let response = test_router()
            .oneshot(synthesize_request("not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["errno"], 400);
    }

    #[tokio::test]
    async fn test_list_voices() {
        let response = test_router()
            .oneshot(Request::builder().uri("/api/voice/list").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["errno"], 0);
        assert_eq!(body["data"][0]["name"], "en_us");
        assert_eq!(body["data"][0]["sample_rate"], 22050);
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["data"]["healthy"], true);
        assert_eq!(body["data"]["backend"], "fake");
    }
}
