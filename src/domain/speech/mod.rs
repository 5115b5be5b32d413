//! Speech Context - 语音合成限界上下文
//!
//! 职责:
//! - 合成请求的输入校验（文本、音色引用、语速）
//! - 合成结果的元数据

mod errors;
mod value_objects;

pub use errors::SpeechError;
pub use value_objects::{
    AudioFormat, SpeechText, Speed, VoiceRef, DEFAULT_MAX_SPEED, DEFAULT_MAX_TEXT_CHARS,
    DEFAULT_MIN_SPEED,
};
