//! HTTP Handlers

mod health;
mod ping;
mod tts;
mod voice;

pub use health::*;
pub use ping::*;
pub use tts::*;
pub use voice::*;
