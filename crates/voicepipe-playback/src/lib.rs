//! Synthesis and ordered delivery of response audio.

pub mod framing;
pub mod local;
pub mod remote;
pub mod sequencer;
pub mod sink;
pub mod synthesizer;

pub use local::LocalSink;
pub use remote::TcpSink;
pub use sequencer::PlaybackSequencer;
pub use sink::AudioSink;
pub use synthesizer::{HttpSynthesizer, SpeechSynthesizer};

use std::time::Duration;
use voicepipe_core::config::PlaybackConfig;
use voicepipe_core::PlaybackError;

/// Create the audio sink variant selected by configuration.
pub fn create_sink(config: &PlaybackConfig) -> Result<Box<dyn AudioSink>, PlaybackError> {
    match config.sink.as_str() {
        "local" => Ok(Box::new(LocalSink::new())),
        "tcp" => Ok(Box::new(TcpSink::new(
            &config.listen_addr,
            Duration::from_secs(config.accept_timeout_secs),
        ))),
        other => Err(PlaybackError::SinkNotFound(other.to_string())),
    }
}
