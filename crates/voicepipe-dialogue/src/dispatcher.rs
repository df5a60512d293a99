use crate::generator::{ResponseGenerator, NO_CONTEXT_SENTINEL};
use voicepipe_core::config::DialogueConfig;
use voicepipe_core::text::split_into_chunks;
use voicepipe_core::DispatchError;

/// Turns a completed utterance into an ordered list of playback-sized text
/// chunks via the external response generator.
pub struct ResponseDispatcher {
    generator: Box<dyn ResponseGenerator>,
    max_chunk_chars: usize,
    rephrase_phrase: String,
    closing_phrase: String,
}

impl ResponseDispatcher {
    pub fn new(generator: Box<dyn ResponseGenerator>, config: &DialogueConfig) -> Self {
        Self {
            generator,
            max_chunk_chars: config.max_chunk_chars,
            rephrase_phrase: config.rephrase_phrase.clone(),
            closing_phrase: config.closing_phrase.clone(),
        }
    }

    /// Call the generator and split its answer into chunks.
    ///
    /// A sentinel ("no context") answer becomes exactly one chunk with the
    /// rephrase phrase and no closing phrase. Generation failure ends the
    /// turn without playback; the caller logs and moves on.
    pub async fn dispatch(&self, utterance: &str) -> Result<Vec<String>, DispatchError> {
        tracing::info!("User: {utterance}");
        let response = self.generator.generate(utterance).await?;

        if response == NO_CONTEXT_SENTINEL {
            tracing::info!("no grounded answer; asking the user to rephrase");
            return Ok(vec![self.rephrase_phrase.clone()]);
        }

        if response.trim().is_empty() {
            tracing::warn!("generator returned an empty response, nothing to play");
            return Ok(Vec::new());
        }

        tracing::info!("Assistant: {response}");
        let mut chunks = split_into_chunks(&response, self.max_chunk_chars);
        chunks.push(self.closing_phrase.clone());
        Ok(chunks)
    }
}
