//! Speech Synthesizer Port - 语音合成引擎抽象
//!
//! 定义语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::speech::{AudioFormat, SpeechError, SpeechText, Speed, VoiceRef};

/// 合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Voice not found: {0}")]
    VoiceNotFound(String),

    #[error("Invalid voice: {0}")]
    InvalidVoice(String),

    #[error("Engine failure: {0}")]
    EngineFailure(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,
}

/// 粗粒度错误分类
///
/// 调用方只关心三类失败：输入错误、音色缺失、引擎故障
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    VoiceResourceNotFound,
    EngineFailure,
}

impl SynthesisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::VoiceNotFound(_) => ErrorKind::VoiceResourceNotFound,
            Self::InvalidVoice(_)
            | Self::EngineFailure(_)
            | Self::Network(_)
            | Self::Timeout => ErrorKind::EngineFailure,
        }
    }

    /// 是否值得重试（仅限网络类错误）
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout)
    }
}

impl From<SpeechError> for SynthesisError {
    fn from(err: SpeechError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// 合成请求（已校验）
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 请求 ID（用于日志和追踪）
    pub request_id: Uuid,
    /// 要合成的文本
    pub text: SpeechText,
    /// 音色引用
    pub voice: VoiceRef,
    /// 语速倍率
    pub speed: Speed,
}

impl SynthesisRequest {
    pub fn new(text: SpeechText, voice: VoiceRef, speed: Speed) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            text,
            voice,
            speed,
        }
    }
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub request_id: Uuid,
    /// 完整的音频文件字节
    pub audio_data: Vec<u8>,
    pub format: AudioFormat,
    pub sample_rate: Option<u32>,
    pub duration_ms: Option<u64>,
}

/// 音色信息
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceInfo {
    pub name: String,
    pub sample_rate: u32,
    pub language: Option<String>,
    pub phoneme_type: String,
    pub num_speakers: u32,
}

/// Speech Synthesizer Port
#[async_trait]
pub trait SpeechSynthesizerPort: Send + Sync {
    /// 执行语音合成
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError>;

    /// 列出可用音色
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError>;

    /// 检查引擎是否可用
    async fn health_check(&self) -> bool {
        true
    }
}
