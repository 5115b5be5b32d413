//! Domain Layer - 领域层
//!
//! - Speech Context: 合成请求的值对象与校验规则
//! - 文本分割器: 逐句合成前的文本切分

pub mod speech;

mod text_segmenter;

pub use text_segmenter::{
    segment_text, SegmentConfig, DEFAULT_MIN_CHARS,
    DEFAULT_WEAK_SPLIT_CHARS,
};
