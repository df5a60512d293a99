use voicepipe_core::PlaybackError;

use crate::sink::AudioSink;
use crate::synthesizer::SpeechSynthesizer;

/// Drives synthesis and delivery of a response, one chunk at a time.
///
/// Chunks within a response play strictly in order because the next chunk is
/// only synthesized after the previous one has been delivered. A chunk whose
/// synthesis fails is skipped; a sink failure ends the whole response.
pub struct PlaybackSequencer {
    synthesizer: Box<dyn SpeechSynthesizer>,
    sink: Box<dyn AudioSink>,
}

impl PlaybackSequencer {
    pub fn new(synthesizer: Box<dyn SpeechSynthesizer>, sink: Box<dyn AudioSink>) -> Self {
        Self { synthesizer, sink }
    }

    pub async fn open(&mut self) -> Result<(), PlaybackError> {
        self.sink.open().await
    }

    pub async fn play(&mut self, chunks: &[String]) -> Result<(), PlaybackError> {
        for (index, chunk) in chunks.iter().enumerate() {
            let audio = match self.synthesizer.synthesize(chunk).await {
                Ok(audio) => audio,
                Err(e) => {
                    tracing::warn!(index, error = %e, "synthesis failed, skipping chunk");
                    continue;
                }
            };
            self.sink.deliver(&audio).await?;
        }
        Ok(())
    }

    pub async fn close(&mut self) {
        self.sink.close().await;
    }
}
