//! espeak-ng Phonemizer
//!
//! 调用 `espeak-ng` 命令行输出 IPA 音素，每行对应一个子句

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::application::ports::{PhonemeSentence, PhonemizeError, Phonemizer};

/// 默认的 espeak-ng 可执行文件
pub const DEFAULT_ESPEAK_PATH: &str = "espeak-ng";

/// espeak-ng 音素化器
#[derive(Debug, Clone)]
pub struct EspeakPhonemizer {
    binary: PathBuf,
}

impl EspeakPhonemizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// 解析 espeak-ng 的 IPA 输出
    ///
    /// 每个非空行是一个句子，句内每个 Unicode 标量是一个音素
    fn parse_output(stdout: &str) -> Vec<PhonemeSentence> {
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(|c| c.to_string()).collect())
            .collect()
    }
}

impl Default for EspeakPhonemizer {
    fn default() -> Self {
        Self::new(DEFAULT_ESPEAK_PATH)
    }
}

impl Phonemizer for EspeakPhonemizer {
    fn phonemize(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<PhonemeSentence>, PhonemizeError> {
        // 文本经 stdin 传入，避免以 '-' 开头的文本被当作参数
        let mut child = Command::new(&self.binary)
            .args(["-q", "--ipa", "-v", language, "--stdin"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                PhonemizeError::Unavailable(format!("{}: {}", self.binary.display(), e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| PhonemizeError::Failed(format!("Failed to write stdin: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| PhonemizeError::Failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PhonemizeError::Failed(format!(
                "espeak-ng exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let sentences = Self::parse_output(&stdout);

        tracing::debug!(
            language = %language,
            text_len = text.len(),
            sentences = sentences.len(),
            "espeak-ng phonemized text"
        );

        Ok(sentences)
    }
}
