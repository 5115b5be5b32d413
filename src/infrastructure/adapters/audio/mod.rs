//! Audio Adapter - WAV 编码与探测

mod wav;

pub use wav::{encode_wav_pcm16, normalize_peak, probe_wav, silence, WavError, WavInfo};
