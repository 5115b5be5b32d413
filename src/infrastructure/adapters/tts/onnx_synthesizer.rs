//! ONNX Synthesizer - 本地 ONNX Runtime 推理
//!
//! 实现 SpeechSynthesizerPort，推理 Piper 格式的 VITS 音色模型
//!
//! 模型输入:
//! - `input`: i64 [1, N] 音素 ID
//! - `input_lengths`: i64 [1]
//! - `scales`: f32 [3] = [noise_scale, length_scale / speed, noise_w]
//! - `sid`: i64 [1]（仅多说话人模型）
//!
//! 模型输出: 第一个输出张量，f32 波形

use async_trait::async_trait;
use dashmap::DashMap;
use ort::{
    session::{builder::GraphOptimizationLevel, Session, SessionInputValue, SessionOutputs},
    value::{Tensor, Value},
};
use std::ffi::OsStr;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::application::ports::{
    PhonemeSentence, PhonemizeError, Phonemizer, SpeechSynthesizerPort, SynthesisError, SynthesisRequest,
    SynthesisResult, VoiceInfo,
};
use crate::domain::speech::{AudioFormat, Speed};
use crate::domain::SegmentConfig;
use crate::infrastructure::adapters::audio::{encode_wav_pcm16, normalize_peak, silence};
use crate::infrastructure::adapters::phonemizer::{
    EspeakPhonemizer, TextPhonemizer, DEFAULT_ESPEAK_PATH,
};
use crate::infrastructure::adapters::voice::{
    InferenceParams, PhonemeType, VoiceConfig, VoiceStore,
};

/// ONNX 合成器配置
#[derive(Debug, Clone)]
pub struct OnnxSynthesizerConfig {
    /// 音色目录
    pub voices_dir: PathBuf,
    /// 单个会话的算子内线程数
    pub intra_threads: usize,
    /// espeak-ng 可执行文件
    pub espeak_path: PathBuf,
    /// 句间静音（毫秒）
    pub sentence_silence_ms: u64,
    /// 文本分句配置（text 类型音色使用）
    pub segment: SegmentConfig,
}

impl Default for OnnxSynthesizerConfig {
    fn default() -> Self {
        Self {
            voices_dir: PathBuf::from("data/voices"),
            intra_threads: 1,
            espeak_path: PathBuf::from(DEFAULT_ESPEAK_PATH),
            sentence_silence_ms: 200,
            segment: SegmentConfig::default(),
        }
    }
}

/// ONNX Runtime 动态库路径的环境变量
pub const ORT_DYLIB_ENV: &str = "ORT_DYLIB_PATH";

/// ONNX Runtime 初始化结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeStatus {
    Ready,
    Unavailable(String),
}

impl RuntimeStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    fn ensure_ready(&self) -> Result<(), SynthesisError> {
        match self {
            Self::Ready => Ok(()),
            Self::Unavailable(reason) => Err(SynthesisError::EngineFailure(format!(
                "ONNX Runtime unavailable: {}",
                reason
            ))),
        }
    }
}

/// 显式指定的动态库路径不存在时返回原因
fn dylib_path_problem(path: Option<&OsStr>) -> Option<String> {
    let path = Path::new(path?);
    (!path.is_file()).then(|| format!("{} = {} is not a file", ORT_DYLIB_ENV, path.display()))
}

/// 初始化 ONNX Runtime 环境（进程内只尝试一次）
///
/// ort 在动态库加载失败时会 panic，这里将其转为 `Unavailable`
pub fn init_runtime() -> RuntimeStatus {
    static STATUS: OnceLock<RuntimeStatus> = OnceLock::new();
    STATUS
        .get_or_init(|| {
            let dylib = std::env::var_os(ORT_DYLIB_ENV);
            if let Some(reason) = dylib_path_problem(dylib.as_deref()) {
                return RuntimeStatus::Unavailable(reason);
            }

            let outcome =
                std::panic::catch_unwind(|| ort::init().with_name("vocalis").commit());
            let status = match outcome {
                Ok(Ok(_)) => RuntimeStatus::Ready,
                Ok(Err(e)) => RuntimeStatus::Unavailable(e.to_string()),
                Err(panic) => RuntimeStatus::Unavailable(
                    panic
                        .downcast_ref::<String>()
                        .cloned()
                        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
                        .unwrap_or_else(|| "failed to load ONNX Runtime".to_string()),
                ),
            };

            match &status {
                RuntimeStatus::Ready => tracing::info!("ONNX Runtime initialized"),
                RuntimeStatus::Unavailable(reason) => {
                    tracing::error!(reason = %reason, "ONNX Runtime unavailable")
                }
            }
            status
        })
        .clone()
}

/// 模型的 scales 输入: [noise_scale, length_scale / speed, noise_w]
fn inference_scales(params: &InferenceParams, speed: Speed) -> [f32; 3] {
    [
        params.noise_scale,
        speed.scale_length(params.length_scale),
        params.noise_w,
    ]
}

/// 逐句推理并拼接
///
/// 编码不出任何音素 ID 的句子被跳过；句间插入 `gap`，最后做峰值归一化。
/// 返回样本与实际合成的句数
fn render_sentences<F>(
    config: &VoiceConfig,
    sentences: &[PhonemeSentence],
    gap: &[f32],
    mut infer: F,
) -> Result<(Vec<f32>, usize), SynthesisError>
where
    F: FnMut(Vec<i64>) -> Result<Vec<f32>, SynthesisError>,
{
    let mut samples: Vec<f32> = Vec::new();
    let mut spoken = 0usize;

    for sentence in sentences {
        let ids = config.encode_phonemes(sentence);
        if ids.is_empty() {
            continue;
        }
        let audio = infer(ids)?;
        if spoken > 0 {
            samples.extend_from_slice(gap);
        }
        samples.extend(audio);
        spoken += 1;
    }

    if spoken == 0 || samples.is_empty() {
        return Err(SynthesisError::InvalidInput(
            "text contains no speakable phonemes".to_string(),
        ));
    }

    normalize_peak(&mut samples);
    Ok((samples, spoken))
}

/// 加锁；锁已中毒时把该条目移出缓存，下次请求重新加载
fn lock_or_evict<'a, K, T>(
    cache: &DashMap<K, Arc<Mutex<T>>>,
    key: &K,
    handle: &'a Arc<Mutex<T>>,
) -> Result<MutexGuard<'a, T>, SynthesisError>
where
    K: Eq + Hash,
{
    handle.lock().map_err(|_| {
        cache.remove_if(key, |_, cached| Arc::ptr_eq(cached, handle));
        tracing::warn!("Voice session poisoned, evicted from cache");
        SynthesisError::EngineFailure("voice session poisoned".to_string())
    })
}

/// 已加载的音色：配置 + ONNX 会话
struct LoadedVoice {
    name: String,
    config: VoiceConfig,
    session: VoiceSession,
}

/// ONNX 会话及其波形输出名
struct VoiceSession {
    session: Session,
    output_name: String,
}

impl LoadedVoice {
    fn load(
        name: String,
        model_path: &Path,
        config: VoiceConfig,
        intra_threads: usize,
    ) -> Result<Self, SynthesisError> {
        let session = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.with_intra_threads(intra_threads))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| {
                SynthesisError::EngineFailure(format!(
                    "Failed to load {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| {
                SynthesisError::InvalidVoice(format!("{}: model has no outputs", name))
            })?;

        tracing::info!(
            voice = %name,
            model = %model_path.display(),
            sample_rate = config.sample_rate(),
            phoneme_type = config.phoneme_type.as_str(),
            "Voice session loaded"
        );

        Ok(Self {
            name,
            config,
            session: VoiceSession {
                session,
                output_name,
            },
        })
    }
}

impl VoiceSession {
    /// 单句推理
    fn infer(
        &mut self,
        config: &VoiceConfig,
        phoneme_ids: Vec<i64>,
        speed: Speed,
    ) -> Result<Vec<f32>, SynthesisError> {
        let params = config.inference;
        let len = phoneme_ids.len();

        let input = Tensor::from_array(([1usize, len], phoneme_ids)).map_err(engine_error)?;
        let input_lengths =
            Tensor::from_array(([1usize], vec![len as i64])).map_err(engine_error)?;
        let scales = Tensor::from_array(([3usize], inference_scales(&params, speed).to_vec()))
            .map_err(engine_error)?;

        let input = SessionInputValue::Owned(Value::from(input));
        let input_lengths = SessionInputValue::Owned(Value::from(input_lengths));
        let scales = SessionInputValue::Owned(Value::from(scales));

        let outputs: SessionOutputs = if config.is_multi_speaker() {
            let sid = Tensor::from_array(([1usize], vec![0i64])).map_err(engine_error)?;
            self.session.run(ort::inputs![
                "input" => input,
                "input_lengths" => input_lengths,
                "scales" => scales,
                "sid" => SessionInputValue::Owned(Value::from(sid)),
            ])
        } else {
            self.session.run(ort::inputs![
                "input" => input,
                "input_lengths" => input_lengths,
                "scales" => scales,
            ])
        }
        .map_err(engine_error)?;

        let (_shape, data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(engine_error)?;

        Ok(data.to_vec())
    }
}

fn engine_error(e: impl std::fmt::Display) -> SynthesisError {
    SynthesisError::EngineFailure(e.to_string())
}

struct Inner {
    config: OnnxSynthesizerConfig,
    store: VoiceStore,
    /// 按模型路径索引的已加载音色
    voices: DashMap<PathBuf, Arc<Mutex<LoadedVoice>>>,
    espeak: Arc<dyn Phonemizer>,
    text: Arc<dyn Phonemizer>,
    runtime: RuntimeStatus,
}

/// ONNX 合成器
///
/// 显式持有推理引擎状态；音色会话在首次使用时加载，
/// 同一音色的会话同一时间只服务一个请求
#[derive(Clone)]
pub struct OnnxSynthesizer {
    inner: Arc<Inner>,
}

impl OnnxSynthesizer {
    pub fn new(config: OnnxSynthesizerConfig) -> Self {
        let espeak: Arc<dyn Phonemizer> = Arc::new(EspeakPhonemizer::new(&config.espeak_path));
        Self::with_runtime(config, espeak, init_runtime())
    }

    /// 使用给定的 IPA 音素化器与 ONNX Runtime 状态
    pub fn with_runtime(
        config: OnnxSynthesizerConfig,
        espeak: Arc<dyn Phonemizer>,
        runtime: RuntimeStatus,
    ) -> Self {
        let text: Arc<dyn Phonemizer> = Arc::new(TextPhonemizer::new(config.segment.clone()));
        let store = VoiceStore::new(&config.voices_dir);

        tracing::info!(
            voices_dir = %config.voices_dir.display(),
            intra_threads = config.intra_threads,
            runtime_ready = runtime.is_ready(),
            "OnnxSynthesizer initialized"
        );

        Self {
            inner: Arc::new(Inner {
                config,
                store,
                voices: DashMap::new(),
                espeak,
                text,
                runtime,
            }),
        }
    }

    /// 已加载的音色数
    pub fn loaded_voices(&self) -> usize {
        self.inner.voices.len()
    }

    /// 获取（必要时加载）音色会话，同时返回缓存键
    fn voice_handle(
        &self,
        request: &SynthesisRequest,
    ) -> Result<(PathBuf, Arc<Mutex<LoadedVoice>>), SynthesisError> {
        let resolved = self.inner.store.resolve(&request.voice)?;

        if let Some(existing) = self.inner.voices.get(&resolved.model_path) {
            return Ok((resolved.model_path, existing.clone()));
        }

        self.inner.runtime.ensure_ready()?;

        // 加载在 map 锁之外进行；并发首次加载时以先插入者为准
        let config = VoiceConfig::load(&resolved.config_path)?;
        let loaded = LoadedVoice::load(
            resolved.name.clone(),
            &resolved.model_path,
            config,
            self.inner.config.intra_threads,
        )?;

        let handle = self
            .inner
            .voices
            .entry(resolved.model_path.clone())
            .or_insert_with(|| Arc::new(Mutex::new(loaded)))
            .clone();
        Ok((resolved.model_path, handle))
    }

    fn phonemizer_for(&self, phoneme_type: PhonemeType) -> &dyn Phonemizer {
        match phoneme_type {
            PhonemeType::Espeak => self.inner.espeak.as_ref(),
            PhonemeType::Text => self.inner.text.as_ref(),
        }
    }

    /// 阻塞式合成，调用方负责放到阻塞线程池
    pub fn synthesize_blocking(
        &self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisResult, SynthesisError> {
        let (key, handle) = self.voice_handle(request)?;
        let mut voice = lock_or_evict(&self.inner.voices, &key, &handle)?;

        let phonemizer = self.phonemizer_for(voice.config.phoneme_type);
        let sentences = phonemizer
            .phonemize(request.text.as_str(), &voice.config.espeak.voice)
            .map_err(|e| match e {
                PhonemizeError::Unavailable(msg) => SynthesisError::EngineFailure(msg),
                PhonemizeError::Failed(msg) => SynthesisError::EngineFailure(msg),
            })?;

        let sample_rate = voice.config.sample_rate();
        let gap = silence(self.inner.config.sentence_silence_ms, sample_rate);
        let LoadedVoice {
            name,
            config,
            session,
        } = &mut *voice;
        let (samples, spoken) = render_sentences(config, &sentences, &gap, |ids| {
            session.infer(config, ids, request.speed)
        })?;

        let duration_ms = samples.len() as u64 * 1000 / sample_rate as u64;
        let audio_data = encode_wav_pcm16(&samples, sample_rate);

        tracing::info!(
            request_id = %request.request_id,
            voice = %name,
            sentences = spoken,
            speed = request.speed.value(),
            duration_ms = duration_ms,
            audio_size = audio_data.len(),
            "ONNX synthesis completed"
        );

        Ok(SynthesisResult {
            request_id: request.request_id,
            audio_data,
            format: AudioFormat::Wav,
            sample_rate: Some(sample_rate),
            duration_ms: Some(duration_ms),
        })
    }
}

#[async_trait]
impl SpeechSynthesizerPort for OnnxSynthesizer {
    async fn synthesize(&self, request: SynthesisRequest) -> Result<SynthesisResult, SynthesisError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.synthesize_blocking(&request))
            .await
            .map_err(|e| SynthesisError::EngineFailure(format!("Synthesis task failed: {}", e)))?
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SynthesisError> {
        let store = self.inner.store.clone();
        tokio::task::spawn_blocking(move || store.list())
            .await
            .map_err(|e| SynthesisError::EngineFailure(e.to_string()))?
    }

    async fn health_check(&self) -> bool {
        self.inner.runtime.is_ready() && self.inner.store.voices_dir().is_dir()
    }
}
