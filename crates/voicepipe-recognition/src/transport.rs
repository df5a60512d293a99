use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use voicepipe_core::config::RecognitionConfig;
use voicepipe_core::{AudioChunk, RecognitionError, RecognitionEvent};

/// The one-time session options message sent before any audio.
///
/// The audio format is fixed by the pipeline: 16-bit linear PCM, mono,
/// 8000 Hz, real-time processing. Language and profanity filtering come
/// from configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOptions {
    pub audio_encoding: String,
    pub sample_rate_hertz: u32,
    pub audio_channel_count: u16,
    pub language_codes: Vec<String>,
    pub profanity_filter: bool,
    pub processing_mode: String,
}

impl SessionOptions {
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self {
            audio_encoding: "linear16_pcm".to_string(),
            sample_rate_hertz: 8000,
            audio_channel_count: 1,
            language_codes: vec![config.language.clone()],
            profanity_filter: config.profanity_filter,
            processing_mode: "real_time".to_string(),
        }
    }
}

/// A recognition event as it appears on the wire.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WireEvent {
    Partial { text: String },
    FinalRefinement { alternatives: Vec<String> },
    Error { message: String },
}

impl From<WireEvent> for RecognitionEvent {
    fn from(event: WireEvent) -> Self {
        match event {
            WireEvent::Partial { text } => RecognitionEvent::Partial(text),
            WireEvent::FinalRefinement { alternatives } => {
                RecognitionEvent::FinalRefinement { alternatives }
            }
            WireEvent::Error { message } => RecognitionEvent::SessionError(message),
        }
    }
}

/// The narrow boundary to the external recognition engine.
///
/// An implementation sends the options message followed by the audio chunk
/// sequence, concurrently draining engine events into the returned channel.
/// Events arrive in engine order; a transport failure is surfaced as a
/// terminal [`RecognitionEvent::SessionError`] and closes the channel.
#[async_trait]
pub trait RecognizerTransport: Send + Sync {
    async fn open_stream(
        &self,
        options: &SessionOptions,
        audio_rx: mpsc::Receiver<AudioChunk>,
    ) -> Result<mpsc::UnboundedReceiver<RecognitionEvent>, RecognitionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_options_fixed_audio_format() {
        let options = SessionOptions::from_config(&RecognitionConfig::default());
        assert_eq!(options.audio_encoding, "linear16_pcm");
        assert_eq!(options.sample_rate_hertz, 8000);
        assert_eq!(options.audio_channel_count, 1);
        assert_eq!(options.processing_mode, "real_time");
    }

    #[test]
    fn test_session_options_from_config() {
        let config = RecognitionConfig {
            language: "kk-KZ".to_string(),
            profanity_filter: false,
            ..RecognitionConfig::default()
        };
        let options = SessionOptions::from_config(&config);
        assert_eq!(options.language_codes, vec!["kk-KZ"]);
        assert!(!options.profanity_filter);
    }

    #[test]
    fn test_wire_event_partial_parses() {
        let event: WireEvent =
            serde_json::from_str(r#"{"event":"partial","text":"hel"}"#).unwrap();
        assert_eq!(
            RecognitionEvent::from(event),
            RecognitionEvent::Partial("hel".to_string())
        );
    }

    #[test]
    fn test_wire_event_final_refinement_parses() {
        let event: WireEvent = serde_json::from_str(
            r#"{"event":"final_refinement","alternatives":["hello world","hallo word"]}"#,
        )
        .unwrap();
        match RecognitionEvent::from(event) {
            RecognitionEvent::FinalRefinement { alternatives } => {
                assert_eq!(alternatives[0], "hello world");
                assert_eq!(alternatives.len(), 2);
            }
            other => panic!("expected FinalRefinement, got {other:?}"),
        }
    }

    #[test]
    fn test_wire_event_error_parses() {
        let event: WireEvent =
            serde_json::from_str(r#"{"event":"error","message":"quota exceeded"}"#).unwrap();
        assert_eq!(
            RecognitionEvent::from(event),
            RecognitionEvent::SessionError("quota exceeded".to_string())
        );
    }

    #[test]
    fn test_wire_event_unknown_tag_fails() {
        let result = serde_json::from_str::<WireEvent>(r#"{"event":"bogus"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_session_options_serializes_to_json() {
        let options = SessionOptions::from_config(&RecognitionConfig::default());
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"sample_rate_hertz\":8000"));
        assert!(json.contains("\"language_codes\":[\"ru-RU\"]"));
    }
}
