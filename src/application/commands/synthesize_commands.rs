//! Synthesize Commands - 语音合成命令

/// 合成语音命令（未校验的原始输入）
#[derive(Debug, Clone)]
pub struct SynthesizeSpeech {
    pub text: String,
    /// 音色引用，None 时使用默认音色
    pub voice: Option<String>,
    /// 语速倍率，None 时为 1.0
    pub speed: Option<f32>,
}

impl SynthesizeSpeech {
    pub fn new(text: impl Into<String>, voice: impl Into<String>, speed: f32) -> Self {
        Self {
            text: text.into(),
            voice: Some(voice.into()),
            speed: Some(speed),
        }
    }
}
