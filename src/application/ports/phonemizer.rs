//! Phonemizer Port - 文本转音素
//!
//! 推理引擎只接受音素 ID，文本到音素的转换由此端口负责

use thiserror::Error;

/// 音素化错误
#[derive(Debug, Error)]
pub enum PhonemizeError {
    #[error("Phonemizer unavailable: {0}")]
    Unavailable(String),

    #[error("Phonemizer failed: {0}")]
    Failed(String),
}

/// 一个句子的音素序列
pub type PhonemeSentence = Vec<String>;

/// Phonemizer Port
///
/// 同步接口：调用方已经处于阻塞线程池中
pub trait Phonemizer: Send + Sync {
    /// 将文本转为按句分组的音素
    ///
    /// `language` 为音色配置里的 espeak 语言代码（如 `en-us`）
    fn phonemize(&self, text: &str, language: &str)
        -> Result<Vec<PhonemeSentence>, PhonemizeError>;
}
