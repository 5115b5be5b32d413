//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod audio;
pub mod phonemizer;
pub mod tts;
pub mod voice;

pub use tts::*;
