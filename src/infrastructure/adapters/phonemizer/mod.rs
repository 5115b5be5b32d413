//! Phonemizer Adapters - 文本转音素实现

mod espeak;
mod text;

pub use espeak::{EspeakPhonemizer, DEFAULT_ESPEAK_PATH};
pub use text::TextPhonemizer;
