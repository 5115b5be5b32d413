//! Text Phonemizer
//!
//! 用于 `phoneme_type = "text"` 的音色：文本字符本身就是音素

use crate::application::ports::{PhonemeSentence, PhonemizeError, Phonemizer};
use crate::domain::{segment_text, SegmentConfig};

/// 字符级音素化器
#[derive(Debug, Clone, Default)]
pub struct TextPhonemizer {
    segment_config: SegmentConfig,
}

impl TextPhonemizer {
    pub fn new(segment_config: SegmentConfig) -> Self {
        Self { segment_config }
    }
}

impl Phonemizer for TextPhonemizer {
    fn phonemize(
        &self,
        text: &str,
        _language: &str,
    ) -> Result<Vec<PhonemeSentence>, PhonemizeError> {
        Ok(segment_text(text, &self.segment_config)
            .into_iter()
            .map(|sentence| {
                sentence
                    .to_lowercase()
                    .chars()
                    .map(|c| c.to_string())
                    .collect()
            })
            .collect())
    }
}
