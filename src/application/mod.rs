//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechSynthesizer、Phonemizer）
//! - commands: 合成命令及处理器
//! - queries: 音色查询及处理器
//! - performer: 对外的语音合成门面

pub mod commands;
pub mod performer;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{SynthesisLimits, SynthesizeSpeechHandler},
    SynthesizeSpeech,
};

pub use performer::SpeechPerformer;

pub use ports::{
    ErrorKind, PhonemeSentence, PhonemizeError, Phonemizer, SpeechSynthesizerPort,
    SynthesisError, SynthesisRequest, SynthesisResult, VoiceInfo,
};

pub use queries::{handlers::ListVoicesHandler, ListVoices};
