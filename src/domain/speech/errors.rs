//! Speech Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpeechError {
    #[error("文本不能为空")]
    EmptyText,

    #[error("文本过长: {chars} 字符 (上限 {max})")]
    TextTooLong { chars: usize, max: usize },

    #[error("无效的音色引用: {0}")]
    InvalidVoiceRef(String),

    #[error("语速超出范围: {value} (允许 {min} - {max})")]
    SpeedOutOfRange { value: f32, min: f32, max: f32 },
}
