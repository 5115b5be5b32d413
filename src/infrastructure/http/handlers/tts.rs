//! TTS HTTP Handlers

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::infrastructure::http::dto::{headers, SynthesizeRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 合成语音，响应体为完整音频文件
///
/// 请求体解析失败同样走 `ApiError` 信封（400）
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SynthesizeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let result = state.performer.synthesize_command(req.into()).await?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.format.content_type())
        .header(header::CONTENT_LENGTH, result.audio_data.len())
        .header(headers::REQUEST_ID, result.request_id.to_string());
    if let Some(sample_rate) = result.sample_rate {
        builder = builder.header(headers::SAMPLE_RATE, sample_rate);
    }
    if let Some(duration_ms) = result.duration_ms {
        builder = builder.header(headers::DURATION_MS, duration_ms);
    }

    builder
        .body(Body::from(result.audio_data))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
