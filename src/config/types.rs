//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::speech::{DEFAULT_MAX_SPEED, DEFAULT_MAX_TEXT_CHARS, DEFAULT_MIN_SPEED};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 合成引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// 合成参数与限制
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5060
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 合成后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineBackend {
    /// 本地 ONNX Runtime 推理
    #[default]
    Onnx,
    /// 转发到外部 TTS 服务
    Remote,
    /// 正弦波，仅用于测试和演练
    Fake,
}

impl EngineBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Onnx => "onnx",
            Self::Remote => "remote",
            Self::Fake => "fake",
        }
    }
}

/// 合成引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub backend: EngineBackend,

    /// 音色目录（`<name>.onnx` + `<name>.onnx.json`）
    #[serde(default = "default_voices_dir")]
    pub voices_dir: PathBuf,

    /// 单个 ONNX 会话的算子内线程数
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,

    /// espeak-ng 可执行文件路径
    #[serde(default = "default_espeak_path")]
    pub espeak_path: PathBuf,

    /// 外部 TTS 服务配置（backend = remote）
    #[serde(default)]
    pub remote: RemoteEngineConfig,
}

fn default_voices_dir() -> PathBuf {
    PathBuf::from("data/voices")
}

fn default_intra_threads() -> usize {
    1
}

fn default_espeak_path() -> PathBuf {
    PathBuf::from("espeak-ng")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: EngineBackend::default(),
            voices_dir: default_voices_dir(),
            intra_threads: default_intra_threads(),
            espeak_path: default_espeak_path(),
            remote: RemoteEngineConfig::default(),
        }
    }
}

/// 外部 TTS 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEngineConfig {
    /// TTS 服务基础 URL
    #[serde(default = "default_remote_url")]
    pub url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,

    /// 最大重试次数
    #[serde(default)]
    pub max_retries: u32,
}

fn default_remote_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_remote_timeout() -> u64 {
    120
}

impl Default for RemoteEngineConfig {
    fn default() -> Self {
        Self {
            url: default_remote_url(),
            timeout_secs: default_remote_timeout(),
            max_retries: 0,
        }
    }
}

/// 合成参数与限制
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// 未指定音色时使用的音色
    #[serde(default = "default_voice")]
    pub default_voice: String,

    #[serde(default = "default_min_speed")]
    pub min_speed: f32,

    #[serde(default = "default_max_speed")]
    pub max_speed: f32,

    /// 单次请求的最大字符数
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// 句间静音（毫秒）
    #[serde(default = "default_sentence_silence_ms")]
    pub sentence_silence_ms: u64,

    /// 最大并发合成数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_voice() -> String {
    "en_us".to_string()
}

fn default_min_speed() -> f32 {
    DEFAULT_MIN_SPEED
}

fn default_max_speed() -> f32 {
    DEFAULT_MAX_SPEED
}

fn default_max_text_chars() -> usize {
    DEFAULT_MAX_TEXT_CHARS
}

fn default_sentence_silence_ms() -> u64 {
    200
}

fn default_max_concurrent() -> usize {
    2
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            default_voice: default_voice(),
            min_speed: default_min_speed(),
            max_speed: default_max_speed(),
            max_text_chars: default_max_text_chars(),
            sentence_silence_ms: default_sentence_silence_ms(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
