//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::SynthesizeSpeech;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// TTS DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default)]
    pub speed: Option<f32>,
}

impl From<SynthesizeRequest> for SynthesizeSpeech {
    fn from(req: SynthesizeRequest) -> Self {
        SynthesizeSpeech {
            text: req.text,
            voice: req.voice,
            speed: req.speed,
        }
    }
}

/// 合成元数据响应头
pub mod headers {
    pub const REQUEST_ID: &str = "X-TTS-Request-Id";
    pub const SAMPLE_RATE: &str = "X-TTS-Sample-Rate";
    pub const DURATION_MS: &str = "X-TTS-Duration-Ms";
}

// ============================================================================
// Health DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub backend: &'static str,
}
