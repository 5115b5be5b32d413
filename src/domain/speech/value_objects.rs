//! Speech Context - Value Objects

use serde::{Deserialize, Serialize};

use super::SpeechError;

/// 默认最小语速
pub const DEFAULT_MIN_SPEED: f32 = 0.25;
/// 默认最大语速
pub const DEFAULT_MAX_SPEED: f32 = 4.0;
/// 单次合成的默认最大字符数
pub const DEFAULT_MAX_TEXT_CHARS: usize = 5000;

const MAX_VOICE_REF_LEN: usize = 128;
const MODEL_EXTENSION: &str = ".onnx";

/// 待合成文本
///
/// 不变量:
/// - 去除首尾空白后非空
/// - 字符数不超过上限
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechText(String);

impl SpeechText {
    pub fn new(text: impl AsRef<str>, max_chars: usize) -> Result<Self, SpeechError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(SpeechError::EmptyText);
        }
        let chars = trimmed.chars().count();
        if chars > max_chars {
            return Err(SpeechError::TextTooLong {
                chars,
                max: max_chars,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl std::fmt::Display for SpeechText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 音色引用
///
/// 可以是音色名（`en_us`）或模型文件名（`voice_en_us.onnx`），
/// 始终相对于音色目录解析，因此不允许出现路径分隔符。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceRef(String);

impl VoiceRef {
    pub fn new(voice: impl AsRef<str>) -> Result<Self, SpeechError> {
        let voice = voice.as_ref().trim();
        if voice.is_empty() {
            return Err(SpeechError::InvalidVoiceRef("音色引用不能为空".to_string()));
        }
        if voice.chars().count() > MAX_VOICE_REF_LEN {
            return Err(SpeechError::InvalidVoiceRef(format!(
                "音色引用长度不能超过{}字符",
                MAX_VOICE_REF_LEN
            )));
        }
        if voice.contains('/') || voice.contains('\\') || voice.contains("..") {
            return Err(SpeechError::InvalidVoiceRef(voice.to_string()));
        }
        if voice == MODEL_EXTENSION {
            return Err(SpeechError::InvalidVoiceRef(voice.to_string()));
        }
        Ok(Self(voice.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 是否直接指定了模型文件名
    pub fn is_model_file(&self) -> bool {
        self.0.ends_with(MODEL_EXTENSION)
    }

    /// 去掉 `.onnx` 后缀的音色名
    pub fn stem(&self) -> &str {
        self.0.strip_suffix(MODEL_EXTENSION).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for VoiceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语速倍率
///
/// 1.0 为模型原始语速，大于 1.0 更快（时长更短）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed(f32);

impl Speed {
    pub fn new(value: f32, min: f32, max: f32) -> Result<Self, SpeechError> {
        if !value.is_finite() || value <= 0.0 || value < min || value > max {
            return Err(SpeechError::SpeedOutOfRange { value, min, max });
        }
        Ok(Self(value))
    }

    /// 使用默认范围校验
    pub fn with_default_range(value: f32) -> Result<Self, SpeechError> {
        Self::new(value, DEFAULT_MIN_SPEED, DEFAULT_MAX_SPEED)
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// 将模型的 length_scale 按语速换算
    pub fn scale_length(&self, length_scale: f32) -> f32 {
        length_scale / self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self(1.0)
    }
}

/// 音频容器格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Wav,
    Mp3,
    Ogg,
    Unknown,
}

impl AudioFormat {
    /// 根据 Content-Type 推断格式
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("wav") {
            Self::Wav
        } else if content_type.contains("mpeg") || content_type.contains("mp3") {
            Self::Mp3
        } else if content_type.contains("ogg") || content_type.contains("opus") {
            Self::Ogg
        } else {
            Self::Unknown
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Unknown => "application/octet-stream",
        }
    }
}
