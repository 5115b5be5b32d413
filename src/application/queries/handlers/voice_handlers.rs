//! Voice Query Handlers

use std::sync::Arc;

use crate::application::ports::{SpeechSynthesizerPort, SynthesisError, VoiceInfo};
use crate::application::queries::ListVoices;

/// ListVoices Handler
pub struct ListVoicesHandler {
    synthesizer: Arc<dyn SpeechSynthesizerPort>,
}

impl ListVoicesHandler {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizerPort>) -> Self {
        Self { synthesizer }
    }

    pub async fn handle(&self, _query: ListVoices) -> Result<Vec<VoiceInfo>, SynthesisError> {
        let voices = self.synthesizer.list_voices().await?;
        tracing::debug!(count = voices.len(), "Listed voices");
        Ok(voices)
    }
}
