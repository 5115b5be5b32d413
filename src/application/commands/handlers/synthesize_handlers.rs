//! Synthesize Command Handlers

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::application::commands::SynthesizeSpeech;
use crate::application::ports::{
    SpeechSynthesizerPort, SynthesisError, SynthesisRequest, SynthesisResult,
};
use crate::domain::speech::{
    SpeechText, Speed, VoiceRef, DEFAULT_MAX_SPEED, DEFAULT_MAX_TEXT_CHARS, DEFAULT_MIN_SPEED,
};

/// 输入校验与并发限制
#[derive(Debug, Clone)]
pub struct SynthesisLimits {
    pub default_voice: String,
    pub min_speed: f32,
    pub max_speed: f32,
    pub max_text_chars: usize,
    /// 最大并发合成数
    pub max_concurrent: usize,
}

impl Default for SynthesisLimits {
    fn default() -> Self {
        Self {
            default_voice: "en_us".to_string(),
            min_speed: DEFAULT_MIN_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            max_concurrent: 2,
        }
    }
}

/// SynthesizeSpeech Handler
///
/// 校验输入后交给合成引擎；信号量限制同时进行的推理数
pub struct SynthesizeSpeechHandler {
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
    limits: SynthesisLimits,
    permits: Arc<Semaphore>,
}

impl SynthesizeSpeechHandler {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizerPort>, limits: SynthesisLimits) -> Self {
        let permits = Arc::new(Semaphore::new(limits.max_concurrent.max(1)));
        Self {
            synthesizer,
            limits,
            permits,
        }
    }

    /// 将原始命令校验为合成请求
    pub fn validate(&self, cmd: &SynthesizeSpeech) -> Result<SynthesisRequest, SynthesisError> {
        let text = SpeechText::new(&cmd.text, self.limits.max_text_chars)?;
        let voice = VoiceRef::new(cmd.voice.as_deref().unwrap_or(&self.limits.default_voice))?;
        let speed = Speed::new(
            cmd.speed.unwrap_or(1.0),
            self.limits.min_speed,
            self.limits.max_speed,
        )?;
        Ok(SynthesisRequest::new(text, voice, speed))
    }

    pub async fn handle(&self, cmd: SynthesizeSpeech) -> Result<SynthesisResult, SynthesisError> {
        let request = self.validate(&cmd)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| SynthesisError::EngineFailure("synthesis queue closed".to_string()))?;

        tracing::debug!(
            request_id = %request.request_id,
            voice = %request.voice,
            speed = request.speed.value(),
            text_chars = request.text.char_count(),
            "Synthesizing speech"
        );

        self.synthesizer.synthesize(request).await
    }

    pub fn synthesizer(&self) -> &Arc<dyn SpeechSynthesizerPort> {
        &self.synthesizer
    }
}
