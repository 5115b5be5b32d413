//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod phonemizer;
mod speech_synthesizer;

pub use phonemizer::{PhonemeSentence, PhonemizeError, Phonemizer};
pub use speech_synthesizer::{
    ErrorKind, SpeechSynthesizerPort, SynthesisError, SynthesisRequest, SynthesisResult,
    VoiceInfo,
};
