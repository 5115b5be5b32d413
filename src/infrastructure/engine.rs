//! Engine wiring - 根据配置组装合成引擎与门面

use std::sync::Arc;

use crate::application::{SpeechPerformer, SpeechSynthesizerPort, SynthesisError, SynthesisLimits};
use crate::config::{AppConfig, EngineBackend};
use crate::domain::SegmentConfig;
use crate::infrastructure::adapters::tts::{
    FakeSynthesizer, OnnxSynthesizer, OnnxSynthesizerConfig, RemoteSynthesizer,
    RemoteSynthesizerConfig,
};

/// 根据 `engine.backend` 创建合成引擎
///
/// ONNX 后端在此初始化 ONNX Runtime（失败时引擎仍可构建，但健康检查为 false），
/// 音色会话在首次合成时创建
pub fn build_synthesizer(
    config: &AppConfig,
) -> Result<Arc<dyn SpeechSynthesizerPort>, SynthesisError> {
    let engine = &config.engine;
    let synthesizer: Arc<dyn SpeechSynthesizerPort> = match engine.backend {
        EngineBackend::Onnx => Arc::new(OnnxSynthesizer::new(OnnxSynthesizerConfig {
            voices_dir: engine.voices_dir.clone(),
            intra_threads: engine.intra_threads,
            espeak_path: engine.espeak_path.clone(),
            sentence_silence_ms: config.synthesis.sentence_silence_ms,
            segment: SegmentConfig::default(),
        })),
        EngineBackend::Remote => Arc::new(RemoteSynthesizer::new(
            RemoteSynthesizerConfig::new(&engine.remote.url)
                .with_timeout(engine.remote.timeout_secs)
                .with_retries(engine.remote.max_retries),
        )?),
        EngineBackend::Fake => Arc::new(FakeSynthesizer::with_defaults()),
    };
    Ok(synthesizer)
}

/// 合成限制
pub fn synthesis_limits(config: &AppConfig) -> SynthesisLimits {
    let synthesis = &config.synthesis;
    SynthesisLimits {
        default_voice: synthesis.default_voice.clone(),
        min_speed: synthesis.min_speed,
        max_speed: synthesis.max_speed,
        max_text_chars: synthesis.max_text_chars,
        max_concurrent: synthesis.max_concurrent,
    }
}

/// 组装语音合成门面
pub fn build_performer(config: &AppConfig) -> Result<SpeechPerformer, SynthesisError> {
    let synthesizer = build_synthesizer(config)?;
    Ok(SpeechPerformer::new(synthesizer, synthesis_limits(config)))
}
