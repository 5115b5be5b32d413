//! Application State
//!
//! HTTP handlers 共享的应用状态

use crate::application::SpeechPerformer;

/// 应用状态
pub struct AppState {
    /// 语音合成门面
    pub performer: SpeechPerformer,
    /// 当前合成后端名称（用于健康检查）
    pub backend: &'static str,
}

impl AppState {
    pub fn new(performer: SpeechPerformer, backend: &'static str) -> Self {
        Self { performer, backend }
    }
}
