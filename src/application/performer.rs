//! Speech Performer - 语音合成门面
//!
//! 对外只暴露一个无状态操作：文本 + 音色 + 语速 -> 音频字节。
//! 所有失败在此边界折叠为 `None`，原因写入日志。

use std::sync::Arc;

use crate::application::commands::handlers::{SynthesisLimits, SynthesizeSpeechHandler};
use crate::application::commands::SynthesizeSpeech;
use crate::application::ports::{
    ErrorKind, SpeechSynthesizerPort, SynthesisError, SynthesisResult, VoiceInfo,
};
use crate::application::queries::handlers::ListVoicesHandler;
use crate::application::queries::ListVoices;

/// 语音合成门面
pub struct SpeechPerformer {
    synthesize_handler: SynthesizeSpeechHandler,
    list_voices_handler: ListVoicesHandler,
}

impl SpeechPerformer {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizerPort>, limits: SynthesisLimits) -> Self {
        Self {
            synthesize_handler: SynthesizeSpeechHandler::new(synthesizer.clone(), limits),
            list_voices_handler: ListVoicesHandler::new(synthesizer),
        }
    }

    /// 合成语音，失败返回 `None`
    pub async fn perform_text(&self, text: &str, voice_file: &str, speed: f32) -> Option<Vec<u8>> {
        match self.synthesize(text, voice_file, speed).await {
            Ok(result) => Some(result.audio_data),
            Err(e) => {
                match e.kind() {
                    ErrorKind::EngineFailure => {
                        tracing::error!(voice = %voice_file, speed = speed, error = %e, "Speech synthesis failed")
                    }
                    _ => {
                        tracing::warn!(voice = %voice_file, speed = speed, error = %e, "Speech synthesis rejected")
                    }
                }
                None
            }
        }
    }

    /// 合成语音，返回带类型的错误
    pub async fn synthesize(
        &self,
        text: &str,
        voice_file: &str,
        speed: f32,
    ) -> Result<SynthesisResult, SynthesisError> {
        self.synthesize_handler
            .handle(SynthesizeSpeech::new(text, voice_file, speed))
            .await
    }

    /// 使用 HTTP 请求的原始参数合成（音色、语速可缺省）
    pub async fn synthesize_command(
        &self,
        cmd: SynthesizeSpeech,
    ) -> Result<SynthesisResult, SynthesisError> {
        self.synthesize_handler.handle(cmd).await
    }

    pub async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        self.list_voices_handler.handle(ListVoices).await
    }

    pub async fn health_check(&self) -> bool {
        self.synthesize_handler.synthesizer().health_check().await
    }
}
