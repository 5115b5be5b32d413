//! Health Handler - 合成引擎健康检查

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, HealthResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 引擎不可用时返回 503
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    if !state.performer.health_check().await {
        return Err(ApiError::ServiceUnavailable(format!(
            "Synthesis backend '{}' is unavailable",
            state.backend
        )));
    }

    Ok(Json(ApiResponse::success(HealthResponse {
        healthy: true,
        backend: state.backend,
    })))
}
