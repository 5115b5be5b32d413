//! Voice Adapter - 音色文件解析
//!
//! 音色 = `<name>.onnx` 模型 + `<name>.onnx.json` 配置（Piper 格式）

mod voice_config;
mod voice_store;

pub use voice_config::{InferenceParams, PhonemeType, VoiceConfig, BOS, EOS, PAD};
pub use voice_store::{ResolvedVoice, VoiceStore};

#[cfg(test)]
pub(crate) use voice_config::tests::SAMPLE_CONFIG as TEST_VOICE_CONFIG;
#[cfg(test)]
pub(crate) use voice_store::tests::write_test_voice;
