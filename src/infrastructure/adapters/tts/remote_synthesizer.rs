//! Remote Synthesizer - 调用外部 TTS HTTP 服务
//!
//! 实现 SpeechSynthesizerPort，通过 HTTP 转发合成请求
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts/synthesize
//! Request: {"text": "...", "voice": "en_us", "speed": 1.0}  (JSON)
//! Response: 音频二进制，元数据在 headers 中
//! GET {base_url}/api/voice/list -> {"data": [VoiceInfo...]}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{
    SpeechSynthesizerPort, SynthesisError, SynthesisRequest, SynthesisResult, VoiceInfo,
};
use crate::domain::speech::AudioFormat;
use crate::infrastructure::adapters::audio::probe_wav;

/// 请求体 (JSON)
#[derive(Debug, Serialize)]
struct RemoteSynthesizeRequest<'a> {
    text: &'a str,
    voice: &'a str,
    speed: f32,
}

#[derive(Debug, Deserialize)]
struct RemoteVoice {
    name: String,
    #[serde(default)]
    sample_rate: u32,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    phoneme_type: Option<String>,
    #[serde(default)]
    num_speakers: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RemoteVoiceList {
    #[serde(default)]
    data: Vec<RemoteVoice>,
}

/// Remote Synthesizer 配置
#[derive(Debug, Clone)]
pub struct RemoteSynthesizerConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 网络错误时的重试次数
    pub max_retries: u32,
}

impl Default for RemoteSynthesizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

impl RemoteSynthesizerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// Remote Synthesizer
pub struct RemoteSynthesizer {
    client: Client,
    config: RemoteSynthesizerConfig,
}

impl RemoteSynthesizer {
    pub fn new(config: RemoteSynthesizerConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn synthesize_url(&self) -> String {
        format!("{}/api/tts/synthesize", self.base())
    }

    fn voices_url(&self) -> String {
        format!("{}/api/voice/list", self.base())
    }

    fn health_url(&self) -> String {
        format!("{}/api/ping", self.base())
    }

    fn map_send_error(e: reqwest::Error) -> SynthesisError {
        if e.is_timeout() {
            SynthesisError::Timeout
        } else if e.is_connect() {
            SynthesisError::Network(format!("Cannot connect to TTS service: {}", e))
        } else {
            SynthesisError::Network(e.to_string())
        }
    }

    fn map_status(status: StatusCode, body: String, voice: &str) -> SynthesisError {
        match status {
            StatusCode::NOT_FOUND => SynthesisError::VoiceNotFound(voice.to_string()),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                SynthesisError::InvalidInput(body)
            }
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => SynthesisError::Timeout,
            _ => SynthesisError::EngineFailure(format!("HTTP {}: {}", status, body)),
        }
    }

    fn header_value<T: std::str::FromStr>(headers: &reqwest::header::HeaderMap, name: &str) -> Option<T> {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    async fn synthesize_once(
        &self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisResult, SynthesisError> {
        let body = RemoteSynthesizeRequest {
            text: request.text.as_str(),
            voice: request.voice.as_str(),
            speed: request.speed.value(),
        };

        tracing::debug!(
            url = %self.synthesize_url(),
            request_id = %request.request_id,
            text_len = body.text.len(),
            voice = %body.voice,
            "Sending remote synthesis request"
        );

        let response = self
            .client
            .post(self.synthesize_url())
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, error_text, body.voice));
        }

        let headers = response.headers();
        let header_sample_rate: Option<u32> = Self::header_value(headers, "X-TTS-Sample-Rate");
        let header_duration_ms: Option<u64> = Self::header_value(headers, "X-TTS-Duration-Ms");
        let format = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(AudioFormat::from_content_type)
            .unwrap_or(AudioFormat::Wav);

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Network(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio_data.is_empty() {
            return Err(SynthesisError::EngineFailure(
                "TTS service returned empty audio".to_string(),
            ));
        }

        // headers 缺失时从 WAV 头部补齐元数据
        let probed = match (format, header_sample_rate, header_duration_ms) {
            (AudioFormat::Wav, None, _) | (AudioFormat::Wav, _, None) => {
                match probe_wav(&audio_data) {
                    Ok(info) => Some(info),
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to probe remote WAV");
                        None
                    }
                }
            }
            _ => None,
        };

        let sample_rate = header_sample_rate.or(probed.as_ref().map(|i| i.sample_rate));
        let duration_ms = header_duration_ms.or(probed.as_ref().map(|i| i.duration_ms));

        tracing::info!(
            request_id = %request.request_id,
            sample_rate = ?sample_rate,
            duration_ms = ?duration_ms,
            audio_size = audio_data.len(),
            "Remote synthesis completed"
        );

        Ok(SynthesisResult {
            request_id: request.request_id,
            audio_data,
            format,
            sample_rate,
            duration_ms,
        })
    }
}

#[async_trait]
impl SpeechSynthesizerPort for RemoteSynthesizer {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError> {
        let mut attempt = 0;
        loop {
            match self.synthesize_once(&request).await {
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        request_id = %request.request_id,
                        attempt = attempt,
                        error = %e,
                        "Remote synthesis failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(200 * attempt as u64)).await;
                }
                other => return other,
            }
        }
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        let response = self
            .client
            .get(self.voices_url())
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SynthesisError::EngineFailure(format!("HTTP {}", status)));
        }

        let list: RemoteVoiceList = response
            .json()
            .await
            .map_err(|e| SynthesisError::EngineFailure(format!("Invalid voice list: {}", e)))?;

        Ok(list
            .data
            .into_iter()
            .map(|v| VoiceInfo {
                name: v.name,
                sample_rate: v.sample_rate,
                language: v.language,
                phoneme_type: v.phoneme_type.unwrap_or_else(|| "remote".to_string()),
                num_speakers: v.num_speakers.unwrap_or(1),
            })
            .collect())
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::{Speed, SpeechText, VoiceRef};
    use crate::infrastructure::adapters::audio::encode_wav_pcm16;
    use axum::http::{header, StatusCode as HttpStatus};
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// 100 ms @ 16 kHz
    fn stub_wav() -> Vec<u8> {
        encode_wav_pcm16(&vec![0.1; 1600], 16000)
    }

    fn request() -> SynthesisRequest {
        SynthesisRequest::new(
            SpeechText::new("Hello", 100).unwrap(),
            VoiceRef::new("en_us").unwrap(),
            Speed::default(),
        )
    }

    /// 在 127.0.0.1 随机端口启动 TTS 桩服务，`reply` 接收第几次调用（从 1 开始）
    async fn spawn_stub<F>(reply: F) -> (String, Arc<AtomicUsize>)
    where
        F: Fn(usize) -> Response + Clone + Send + Sync + 'static,
    {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/api/tts/synthesize",
            post(move || {
                let counter = counter.clone();
                let reply = reply.clone();
                async move { reply(counter.fetch_add(1, Ordering::SeqCst) + 1) }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), hits)
    }

    fn client(base_url: &str, retries: u32) -> RemoteSynthesizer {
        RemoteSynthesizer::new(
            RemoteSynthesizerConfig::new(base_url)
                .with_timeout(5)
                .with_retries(retries),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let (url, hits) = spawn_stub(|call| {
            if call == 1 {
                (HttpStatus::GATEWAY_TIMEOUT, "busy").into_response()
            } else {
                ([(header::CONTENT_TYPE, "audio/wav")], stub_wav()).into_response()
            }
        })
        .await;

        let result = client(&url, 2).synthesize(request()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(result.format, AudioFormat::Wav);
        assert_eq!(&result.audio_data[0..4], b"RIFF");
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (url, hits) =
            spawn_stub(|_| (HttpStatus::GATEWAY_TIMEOUT, "busy").into_response()).await;

        let err = client(&url, 1).synthesize(request()).await.unwrap_err();
        assert!(matches!(err, SynthesisError::Timeout));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_voice_not_found_is_not_retried() {
        let (url, hits) = spawn_stub(|_| (HttpStatus::NOT_FOUND, "no voice").into_response()).await;

        let err = client(&url, 3).synthesize(request()).await.unwrap_err();
        assert!(matches!(err, SynthesisError::VoiceNotFound(v) if v == "en_us"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_metadata_headers_take_precedence() {
        let (url, _) = spawn_stub(|_| {
            (
                [
                    (header::CONTENT_TYPE, "audio/wav"),
                    (header::HeaderName::from_static("x-tts-sample-rate"), "22050"),
                    (header::HeaderName::from_static("x-tts-duration-ms"), "999"),
                ],
                stub_wav(),
            )
                .into_response()
        })
        .await;

        let result = client(&url, 0).synthesize(request()).await.unwrap();
        assert_eq!(result.sample_rate, Some(22050));
        assert_eq!(result.duration_ms, Some(999));
    }

    #[tokio::test]
    async fn test_missing_headers_read_from_wav() {
        let (url, _) =
            spawn_stub(|_| ([(header::CONTENT_TYPE, "audio/wav")], stub_wav()).into_response())
                .await;

        let result = client(&url, 0).synthesize(request()).await.unwrap();
        assert_eq!(result.sample_rate, Some(16000));
        assert_eq!(result.duration_ms, Some(100));
    }

    #[tokio::test]
    async fn test_empty_audio_is_engine_failure() {
        let (url, hits) = spawn_stub(|_| {
            ([(header::CONTENT_TYPE, "audio/wav")], Vec::<u8>::new()).into_response()
        })
        .await;

        let err = client(&url, 2).synthesize(request()).await.unwrap_err();
        assert!(matches!(err, SynthesisError::EngineFailure(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_config_default() {
        let config = RemoteSynthesizerConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = RemoteSynthesizerConfig::new("http://example.com:9000/")
            .with_timeout(60)
            .with_retries(2);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_retries, 2);

        let client = RemoteSynthesizer::new(config).unwrap();
        assert_eq!(
            client.synthesize_url(),
            "http://example.com:9000/api/tts/synthesize"
        );
        assert_eq!(client.voices_url(), "http://example.com:9000/api/voice/list");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            RemoteSynthesizer::map_status(StatusCode::NOT_FOUND, String::new(), "en_us"),
            SynthesisError::VoiceNotFound(v) if v == "en_us"
        ));
        assert!(matches!(
            RemoteSynthesizer::map_status(StatusCode::BAD_REQUEST, "empty".into(), "en_us"),
            SynthesisError::InvalidInput(_)
        ));
        assert!(matches!(
            RemoteSynthesizer::map_status(StatusCode::GATEWAY_TIMEOUT, String::new(), "en_us"),
            SynthesisError::Timeout
        ));
        assert!(matches!(
            RemoteSynthesizer::map_status(StatusCode::INTERNAL_SERVER_ERROR, String::new(), "en_us"),
            SynthesisError::EngineFailure(_)
        ));
    }

    #[tokio::test]
    async fn test_health_check_unreachable_service() {
        // 端口 9 (discard) 通常无人监听
        let client = RemoteSynthesizer::new(
            RemoteSynthesizerConfig::new("http://127.0.0.1:9").with_timeout(2),
        )
        .unwrap();
        assert!(!client.health_check().await);
    }
}
