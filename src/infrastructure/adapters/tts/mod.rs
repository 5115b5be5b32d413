//! TTS Adapter - 语音合成引擎实现

mod fake_synthesizer;
mod onnx_synthesizer;
mod remote_synthesizer;

pub use fake_synthesizer::{FakeSynthesizer, FakeSynthesizerConfig};
pub use onnx_synthesizer::{OnnxSynthesizer, OnnxSynthesizerConfig, RuntimeStatus};
pub use remote_synthesizer::{RemoteSynthesizer, RemoteSynthesizerConfig};
