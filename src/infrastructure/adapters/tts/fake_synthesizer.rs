//! Fake Synthesizer - 用于测试的合成器
//!
//! 不加载任何模型，按文本长度和语速生成固定频率的正弦波

use async_trait::async_trait;
use std::f32::consts::PI;

use crate::application::ports::{
    SpeechSynthesizerPort, SynthesisError, SynthesisRequest, SynthesisResult, VoiceInfo,
};
use crate::domain::speech::AudioFormat;
use crate::infrastructure::adapters::audio::encode_wav_pcm16;

/// Fake Synthesizer 配置
#[derive(Debug, Clone)]
pub struct FakeSynthesizerConfig {
    /// 可用的音色名（音色引用去掉 `.onnx` 后缀比较）
    pub voices: Vec<String>,
    /// 每个字符对应的时长（毫秒，语速 1.0 时）
    pub ms_per_char: u64,
    pub sample_rate: u32,
    pub tone_hz: f32,
}

impl Default for FakeSynthesizerConfig {
    fn default() -> Self {
        Self {
            voices: vec!["en_us".to_string()],
            ms_per_char: 60,
            sample_rate: 22050,
            tone_hz: 220.0,
        }
    }
}

/// Fake Synthesizer
pub struct FakeSynthesizer {
    config: FakeSynthesizerConfig,
}

impl FakeSynthesizer {
    pub fn new(config: FakeSynthesizerConfig) -> Self {
        tracing::info!(voices = ?config.voices, "FakeSynthesizer initialized");
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeSynthesizerConfig::default())
    }

    fn knows_voice(&self, voice: &str) -> bool {
        let stem = voice.strip_prefix("voice_").unwrap_or(voice);
        self.config.voices.iter().any(|v| v == voice || v == stem)
    }

    fn tone(&self, duration_ms: u64) -> Vec<f32> {
        let rate = self.config.sample_rate as f32;
        let len = (self.config.sample_rate as u64 * duration_ms / 1000) as usize;
        (0..len)
            .map(|i| 0.3 * (2.0 * PI * self.config.tone_hz * i as f32 / rate).sin())
            .collect()
    }
}

#[async_trait]
impl SpeechSynthesizerPort for FakeSynthesizer {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError> {
        if !self.knows_voice(request.voice.stem()) {
            return Err(SynthesisError::VoiceNotFound(request.voice.to_string()));
        }

        let base_ms = request.text.char_count() as u64 * self.config.ms_per_char;
        let duration_ms = ((base_ms as f32 / request.speed.value()).round() as u64).max(1);
        let samples = self.tone(duration_ms);

        tracing::debug!(
            request_id = %request.request_id,
            voice = %request.voice,
            duration_ms = duration_ms,
            "FakeSynthesizer: returning tone"
        );

        Ok(SynthesisResult {
            request_id: request.request_id,
            audio_data: encode_wav_pcm16(&samples, self.config.sample_rate),
            format: AudioFormat::Wav,
            sample_rate: Some(self.config.sample_rate),
            duration_ms: Some(duration_ms),
        })
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        Ok(self
            .config
            .voices
            .iter()
            .map(|name| VoiceInfo {
                name: name.clone(),
                sample_rate: self.config.sample_rate,
                language: None,
                phoneme_type: "text".to_string(),
                num_speakers: 1,
            })
            .collect())
    }
}
