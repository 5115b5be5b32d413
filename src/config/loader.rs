//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, EngineBackend};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "VOCALIS";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOCALIS_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOCALIS_SERVER__PORT=8080`
/// - `VOCALIS_ENGINE__BACKEND=remote`
/// - `VOCALIS_ENGINE__REMOTE__URL=http://tts-server:8000`
/// - `VOCALIS_SYNTHESIS__MAX_CONCURRENT=4`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 例如: VOCALIS_ENGINE__VOICES_DIR=/opt/voices
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    // 缺失的字段由 serde default 补齐
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    let synthesis = &config.synthesis;
    if !(synthesis.min_speed.is_finite() && synthesis.min_speed > 0.0) {
        return Err(ConfigError::ValidationError(
            "min_speed must be a positive number".to_string(),
        ));
    }
    if !synthesis.max_speed.is_finite() || synthesis.max_speed < synthesis.min_speed {
        return Err(ConfigError::ValidationError(
            "max_speed must be >= min_speed".to_string(),
        ));
    }
    if synthesis.max_text_chars == 0 {
        return Err(ConfigError::ValidationError(
            "max_text_chars cannot be 0".to_string(),
        ));
    }
    if synthesis.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "max_concurrent cannot be 0".to_string(),
        ));
    }
    if synthesis.default_voice.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "default_voice cannot be empty".to_string(),
        ));
    }

    match config.engine.backend {
        EngineBackend::Remote if config.engine.remote.url.is_empty() => {
            return Err(ConfigError::ValidationError(
                "Remote engine URL cannot be empty".to_string(),
            ));
        }
        EngineBackend::Onnx if config.engine.intra_threads == 0 => {
            return Err(ConfigError::ValidationError(
                "intra_threads cannot be 0".to_string(),
            ));
        }
        _ => {}
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Engine Backend: {}", config.engine.backend.as_str());
    match config.engine.backend {
        EngineBackend::Onnx => {
            tracing::info!("Voices Directory: {:?}", config.engine.voices_dir);
            tracing::info!("Intra Threads: {}", config.engine.intra_threads);
            tracing::info!("espeak-ng: {:?}", config.engine.espeak_path);
        }
        EngineBackend::Remote => {
            tracing::info!("Remote URL: {}", config.engine.remote.url);
            tracing::info!("Remote Timeout: {}s", config.engine.remote.timeout_secs);
        }
        EngineBackend::Fake => {}
    }
    tracing::info!("Default Voice: {}", config.synthesis.default_voice);
    tracing::info!(
        "Speed Range: {} - {}",
        config.synthesis.min_speed,
        config.synthesis.max_speed
    );
    tracing::info!("Max Concurrent: {}", config.synthesis.max_concurrent);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
