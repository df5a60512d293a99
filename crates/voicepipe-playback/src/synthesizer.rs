use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Serialize;
use voicepipe_core::config::SynthesisConfig;
use voicepipe_core::PlaybackError;

/// Converts a text chunk into synthesized audio bytes (WAV).
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, PlaybackError>;
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    format: &'a str,
    voice: &'a str,
    role: &'a str,
    speed: f32,
    loudness_normalization: &'a str,
}

/// Streaming HTTP synthesis client. The service answers with the audio body
/// in fragments; they are concatenated into one WAV segment per chunk.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    voice: String,
    role: String,
    speed: f32,
}

impl HttpSynthesizer {
    pub fn new(config: &SynthesisConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            voice: config.voice.clone(),
            role: config.role.clone(),
            speed: config.speed,
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, PlaybackError> {
        let request = SynthesisRequest {
            text,
            format: "wav",
            voice: &self.voice,
            role: &self.role,
            speed: self.speed,
            loudness_normalization: "lufs",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("authorization", format!("Api-Key {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| PlaybackError::Synthesis(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PlaybackError::Synthesis(format!(
                "synthesis service returned {}",
                response.status()
            )));
        }

        let mut audio = Vec::new();
        let mut body = response.bytes_stream();
        while let Some(fragment) = body.next().await {
            let fragment = fragment.map_err(|e| PlaybackError::Synthesis(e.to_string()))?;
            audio.extend_from_slice(&fragment);
        }

        tracing::debug!(chars = text.chars().count(), bytes = audio.len(), "synthesized chunk");
        Ok(audio)
    }
}
