//! Voice Store - 音色目录
//!
//! 将音色引用解析为模型文件与配置文件

use std::path::{Path, PathBuf};

use crate::application::ports::{SynthesisError, VoiceInfo};
use crate::domain::speech::VoiceRef;

use super::VoiceConfig;

/// 已解析的音色文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVoice {
    /// 规范化的音色名（模型文件名去掉 `.onnx`）
    pub name: String,
    pub model_path: PathBuf,
    pub config_path: PathBuf,
}

/// 音色目录
#[derive(Debug, Clone)]
pub struct VoiceStore {
    voices_dir: PathBuf,
}

impl VoiceStore {
    pub fn new(voices_dir: impl AsRef<Path>) -> Self {
        Self {
            voices_dir: voices_dir.as_ref().to_path_buf(),
        }
    }

    pub fn voices_dir(&self) -> &Path {
        &self.voices_dir
    }

    /// 候选模型文件名（按优先级）
    fn candidate_files(voice: &VoiceRef) -> Vec<String> {
        if voice.is_model_file() {
            vec![voice.as_str().to_string()]
        } else {
            vec![
                format!("{}.onnx", voice.as_str()),
                format!("voice_{}.onnx", voice.as_str()),
            ]
        }
    }

    /// 模型旁的配置文件：优先 `<model>.onnx.json`，其次 `<stem>.json`
    fn config_path_for(model_path: &Path) -> Option<PathBuf> {
        let mut sidecar = model_path.as_os_str().to_owned();
        sidecar.push(".json");
        let sidecar = PathBuf::from(sidecar);
        if sidecar.is_file() {
            return Some(sidecar);
        }

        let plain = model_path.with_extension("json");
        plain.is_file().then_some(plain)
    }

    /// 解析音色引用
    ///
    /// - 模型文件不存在 -> `VoiceNotFound`
    /// - 配置文件不存在 -> `InvalidVoice`
    pub fn resolve(&self, voice: &VoiceRef) -> Result<ResolvedVoice, SynthesisError> {
        let model_path = Self::candidate_files(voice)
            .into_iter()
            .map(|file| self.voices_dir.join(file))
            .find(|path| path.is_file())
            .ok_or_else(|| SynthesisError::VoiceNotFound(voice.to_string()))?;

        let config_path = Self::config_path_for(&model_path).ok_or_else(|| {
            SynthesisError::InvalidVoice(format!(
                "{}: missing voice config",
                model_path.display()
            ))
        })?;

        let name = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_else(|| voice.stem())
            .to_string();

        tracing::debug!(
            voice = %voice,
            model = %model_path.display(),
            config = %config_path.display(),
            "Voice resolved"
        );

        Ok(ResolvedVoice {
            name,
            model_path,
            config_path,
        })
    }

    /// 列出目录中所有可用音色（按名称排序）
    ///
    /// 没有配置或配置无效的模型会被跳过
    pub fn list(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        let entries = match std::fs::read_dir(&self.voices_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(dir = %self.voices_dir.display(), "Voices directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(SynthesisError::EngineFailure(format!(
                    "Failed to read voices directory: {}",
                    e
                )))
            }
        };

        let mut voices = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("onnx") || !path.is_file() {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(config_path) = Self::config_path_for(&path) else {
                tracing::debug!(model = %path.display(), "Skipping voice without config");
                continue;
            };
            match VoiceConfig::load(&config_path) {
                Ok(config) => voices.push(config.to_info(name)),
                Err(e) => tracing::warn!(error = %e, "Skipping voice with invalid config"),
            }
        }

        voices.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(voices)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::infrastructure::adapters::voice::voice_config::tests::SAMPLE_CONFIG;
    use tempfile::TempDir;

    /// 在目录中写入一个测试音色（模型内容为占位字节）
    pub(crate) fn write_test_voice(dir: &Path, model_file: &str) {
        std::fs::write(dir.join(model_file), b"onnx").unwrap();
        std::fs::write(dir.join(format!("{}.json", model_file)), SAMPLE_CONFIG).unwrap();
    }

    fn voice(s: &str) -> VoiceRef {
        VoiceRef::new(s).unwrap()
    }

    #[test]
    fn test_resolve_by_name() {
        let dir = TempDir::new().unwrap();
        write_test_voice(dir.path(), "en_us.onnx");
        let store = VoiceStore::new(dir.path());

        let resolved = store.resolve(&voice("en_us")).unwrap();
        assert_eq!(resolved.name, "en_us");
        assert_eq!(resolved.model_path, dir.path().join("en_us.onnx"));
        assert_eq!(resolved.config_path, dir.path().join("en_us.onnx.json"));
    }

    #[test]
    fn test_resolve_prefixed_voice_file() {
        let dir = TempDir::new().unwrap();
        write_test_voice(dir.path(), "voice_en_us.onnx");
        let store = VoiceStore::new(dir.path());

        // 音色名和完整文件名都能解析到同一个模型
        let by_name = store.resolve(&voice("en_us")).unwrap();
        let by_file = store.resolve(&voice("voice_en_us.onnx")).unwrap();
        assert_eq!(by_name, by_file);
        assert_eq!(by_name.name, "voice_en_us");
    }

    #[test]
    fn test_exact_name_preferred_over_prefixed() {
        let dir = TempDir::new().unwrap();
        write_test_voice(dir.path(), "en_us.onnx");
        write_test_voice(dir.path(), "voice_en_us.onnx");
        let store = VoiceStore::new(dir.path());

        assert_eq!(store.resolve(&voice("en_us")).unwrap().name, "en_us");
    }

    #[test]
    fn test_plain_json_config_fallback() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("de.onnx"), b"onnx").unwrap();
        std::fs::write(dir.path().join("de.json"), SAMPLE_CONFIG).unwrap();
        let store = VoiceStore::new(dir.path());

        let resolved = store.resolve(&voice("de")).unwrap();
        assert_eq!(resolved.config_path, dir.path().join("de.json"));
    }

    #[test]
    fn test_missing_voice() {
        let dir = TempDir::new().unwrap();
        let store = VoiceStore::new(dir.path());
        let err = store.resolve(&voice("missing")).unwrap_err();
        assert!(matches!(err, SynthesisError::VoiceNotFound(_)));
    }

    #[test]
    fn test_missing_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("en_us.onnx"), b"onnx").unwrap();
        let store = VoiceStore::new(dir.path());
        let err = store.resolve(&voice("en_us")).unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidVoice(_)));
    }

    #[test]
    fn test_load_rejects_malformed_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("en_us.onnx"), b"onnx").unwrap();
        std::fs::write(dir.path().join("en_us.onnx.json"), "{").unwrap();
        let store = VoiceStore::new(dir.path());
        let resolved = store.resolve(&voice("en_us")).unwrap();
        let err = VoiceConfig::load(&resolved.config_path).unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidVoice(_)));
    }

    #[test]
    fn test_list_voices_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write_test_voice(dir.path(), "zh_cn.onnx");
        write_test_voice(dir.path(), "en_us.onnx");
        std::fs::write(dir.path().join("orphan.onnx"), b"onnx").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"hi").unwrap();
        let store = VoiceStore::new(dir.path());

        let names: Vec<String> = store.list().unwrap().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["en_us", "zh_cn"]);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let store = VoiceStore::new("/definitely/not/a/voices/dir");
        assert!(store.list().unwrap().is_empty());
    }
}
