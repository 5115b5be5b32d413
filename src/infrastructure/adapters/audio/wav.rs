//! WAV 编码与探测
//!
//! - 引擎输出的 f32 样本编码为 16-bit PCM 单声道 WAV
//! - 基于 symphonia 探测远端引擎返回的 WAV 元数据

use std::io::Cursor;

use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

const WAV_HEADER_LEN: usize = 44;
const BITS_PER_SAMPLE: u16 = 16;

/// WAV 处理错误
#[derive(Debug, Error)]
pub enum WavError {
    #[error("Invalid WAV: {0}")]
    InvalidInput(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// WAV 元数据
#[derive(Debug, Clone, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u8,
    pub frames: u64,
    pub duration_ms: u64,
}

/// 将 f32 样本（[-1.0, 1.0]）编码为 16-bit PCM 单声道 WAV
pub fn encode_wav_pcm16(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let num_channels: u16 = 1;
    let byte_rate = sample_rate * num_channels as u32 * (BITS_PER_SAMPLE / 8) as u32;
    let block_align = num_channels * (BITS_PER_SAMPLE / 8);

    let data_size = samples.len() * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());

    for &sample in samples {
        let pcm = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        wav.extend_from_slice(&pcm.to_le_bytes());
    }

    wav
}

/// 峰值超过满刻度时整体缩放，否则原样保留
pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples
        .iter()
        .filter(|s| s.is_finite())
        .fold(0.0f32, |acc, s| acc.max(s.abs()));

    if peak > 1.0 {
        let gain = 1.0 / peak;
        for s in samples.iter_mut() {
            *s *= gain;
        }
    }

    for s in samples.iter_mut() {
        if !s.is_finite() {
            *s = 0.0;
        }
    }
}

/// 生成指定时长的静音
pub fn silence(duration_ms: u64, sample_rate: u32) -> Vec<f32> {
    let len = (sample_rate as u64 * duration_ms / 1000) as usize;
    vec![0.0; len]
}

/// 探测 WAV 数据的采样率、声道数与时长
pub fn probe_wav(data: &[u8]) -> Result<WavInfo, WavError> {
    if data.len() < WAV_HEADER_LEN || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(WavError::InvalidInput(
            "missing RIFF/WAVE header".to_string(),
        ));
    }

    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("wav");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| WavError::DecodingError(format!("Probe failed: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| WavError::DecodingError("No audio track found".to_string()))?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| WavError::DecodingError("Unknown sample rate".to_string()))?;

    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u8)
        .ok_or_else(|| WavError::DecodingError("Unknown channel count".to_string()))?;

    let n_frames = track.codec_params.n_frames;
    let frames = match n_frames {
        Some(n) => n,
        None => {
            // 头部没有帧数信息时逐包解码计数
            let mut decoder = symphonia::default::get_codecs()
                .make(&track.codec_params, &DecoderOptions::default())
                .map_err(|e| WavError::DecodingError(format!("Decoder creation failed: {}", e)))?;
            let track_id = track.id;
            let mut frames = 0u64;

            loop {
                let packet = match format.next_packet() {
                    Ok(p) => p,
                    Err(symphonia::core::errors::Error::IoError(e))
                        if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        break;
                    }
                    Err(e) => {
                        return Err(WavError::DecodingError(format!(
                            "Packet read error: {}",
                            e
                        )));
                    }
                };

                if packet.track_id() != track_id {
                    continue;
                }

                match decoder.decode(&packet) {
                    Ok(decoded) => frames += decoded.frames() as u64,
                    Err(e) => tracing::warn!("Decode error (skipping packet): {}", e),
                }
            }

            frames
        }
    };

    let duration_ms = if sample_rate > 0 {
        frames * 1000 / sample_rate as u64
    } else {
        0
    };

    Ok(WavInfo {
        sample_rate,
        channels,
        frames,
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_header_layout() {
        let wav = encode_wav_pcm16(&[0.0, 0.5, -0.5, 1.0], 22050);
        assert_eq!(wav.len(), WAV_HEADER_LEN + 8);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]), 36 + 8);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        // 单声道
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 1);
        assert_eq!(
            u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]),
            22050
        );
        assert_eq!(u16::from_le_bytes([wav[34], wav[35]]), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 8);
        // 满刻度样本
        assert_eq!(i16::from_le_bytes([wav[50], wav[51]]), 32767);
    }

    #[test]
    fn test_samples_are_clamped() {
        let wav = encode_wav_pcm16(&[2.0, -2.0], 16000);
        assert_eq!(i16::from_le_bytes([wav[44], wav[45]]), 32767);
        assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), -32767);
    }

    #[test]
    fn test_normalize_peak_only_when_clipping() {
        let mut quiet = vec![0.2, -0.4];
        normalize_peak(&mut quiet);
        assert_eq!(quiet, vec![0.2, -0.4]);

        let mut loud = vec![1.0, -2.0, f32::NAN];
        normalize_peak(&mut loud);
        assert_eq!(loud, vec![0.5, -1.0, 0.0]);
    }

    #[test]
    fn test_silence_length() {
        assert_eq!(silence(200, 22050).len(), 4410);
        assert!(silence(0, 22050).is_empty());
    }

    #[test]
    fn test_probe_encoded_wav() {
        let samples = vec![0.1f32; 22050];
        let wav = encode_wav_pcm16(&samples, 22050);
        let info = probe_wav(&wav).unwrap();
        assert_eq!(info.sample_rate, 22050);
        assert_eq!(info.channels, 1);
        assert_eq!(info.frames, 22050);
        assert_eq!(info.duration_ms, 1000);
    }

    #[test]
    fn test_probe_rejects_garbage() {
        assert!(probe_wav(b"not a wav file at all, definitely not one").is_err());
        assert!(probe_wav(&[]).is_err());
    }
}
