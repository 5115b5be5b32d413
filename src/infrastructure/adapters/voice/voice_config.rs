//! Voice Config - Piper 格式的音色配置

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::application::ports::{SynthesisError, VoiceInfo};

/// 句首标记
pub const BOS: &str = "^";
/// 句尾标记
pub const EOS: &str = "$";
/// 音素间填充
pub const PAD: &str = "_";

/// 音素来源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhonemeType {
    /// espeak-ng 生成的 IPA 音素
    #[default]
    Espeak,
    /// 直接使用文本字符
    Text,
}

impl PhonemeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Espeak => "espeak",
            Self::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioSection {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_sample_rate() -> u32 {
    22050
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspeakSection {
    #[serde(default = "default_espeak_voice")]
    pub voice: String,
}

fn default_espeak_voice() -> String {
    "en-us".to_string()
}

impl Default for EspeakSection {
    fn default() -> Self {
        Self {
            voice: default_espeak_voice(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageSection {
    pub code: String,
}

/// 推理参数
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct InferenceParams {
    #[serde(default = "default_noise_scale")]
    pub noise_scale: f32,
    #[serde(default = "default_length_scale")]
    pub length_scale: f32,
    #[serde(default = "default_noise_w")]
    pub noise_w: f32,
}

fn default_noise_scale() -> f32 {
    0.667
}

fn default_length_scale() -> f32 {
    1.0
}

fn default_noise_w() -> f32 {
    0.8
}

impl Default for InferenceParams {
    fn default() -> Self {
        Self {
            noise_scale: default_noise_scale(),
            length_scale: default_length_scale(),
            noise_w: default_noise_w(),
        }
    }
}

/// 音色配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    #[serde(default)]
    pub audio: AudioSection,

    #[serde(default)]
    pub espeak: EspeakSection,

    #[serde(default)]
    pub language: Option<LanguageSection>,

    #[serde(default)]
    pub inference: InferenceParams,

    #[serde(default)]
    pub phoneme_type: PhonemeType,

    /// 音素替换表
    #[serde(default)]
    pub phoneme_map: HashMap<String, Vec<String>>,

    /// 音素到模型输入 ID 的映射
    pub phoneme_id_map: HashMap<String, Vec<i64>>,

    #[serde(default = "default_num_speakers")]
    pub num_speakers: u32,
}

fn default_num_speakers() -> u32 {
    1
}

impl VoiceConfig {
    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> Result<Self, SynthesisError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SynthesisError::InvalidVoice(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
            .map_err(|e| SynthesisError::InvalidVoice(format!("{}: {}", path.display(), e)))
    }

    /// 解析并校验配置
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let config: VoiceConfig = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.audio.sample_rate == 0 {
            return Err("sample_rate cannot be 0".to_string());
        }
        for marker in [BOS, EOS, PAD] {
            if !self.phoneme_id_map.contains_key(marker) {
                return Err(format!("phoneme_id_map is missing '{}'", marker));
            }
        }
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        self.audio.sample_rate
    }

    pub fn is_multi_speaker(&self) -> bool {
        self.num_speakers > 1
    }

    /// 将一个句子的音素编码为模型输入 ID
    ///
    /// 布局: BOS, PAD, (音素 ID, PAD)*, EOS。映射表中不存在的音素被跳过。
    /// 句子不含任何可识别音素时返回空序列。
    pub fn encode_phonemes(&self, phonemes: &[String]) -> Vec<i64> {
        let mut body: Vec<i64> = Vec::with_capacity(phonemes.len() * 2);
        let pad = &self.phoneme_id_map[PAD];

        for phoneme in phonemes {
            let mapped = self.phoneme_map.get(phoneme);
            let expanded: Vec<&String> = match mapped {
                Some(replacements) => replacements.iter().collect(),
                None => vec![phoneme],
            };

            for p in expanded {
                match self.phoneme_id_map.get(p.as_str()) {
                    Some(ids) => {
                        body.extend_from_slice(ids);
                        body.extend_from_slice(pad);
                    }
                    None => tracing::debug!(phoneme = %p, "Missing phoneme in id map, skipping"),
                }
            }
        }

        if body.is_empty() {
            return body;
        }

        let mut ids = Vec::with_capacity(body.len() + 2 + pad.len());
        ids.extend_from_slice(&self.phoneme_id_map[BOS]);
        ids.extend_from_slice(pad);
        ids.extend(body);
        ids.extend_from_slice(&self.phoneme_id_map[EOS]);
        ids
    }

    /// 生成对外展示的音色信息
    pub fn to_info(&self, name: impl Into<String>) -> VoiceInfo {
        VoiceInfo {
            name: name.into(),
            sample_rate: self.audio.sample_rate,
            language: self
                .language
                .as_ref()
                .map(|l| l.code.clone())
                .or_else(|| Some(self.espeak.voice.clone())),
            phoneme_type: self.phoneme_type.as_str().to_string(),
            num_speakers: self.num_speakers,
        }
    }
}
