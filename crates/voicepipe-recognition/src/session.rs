use crate::transport::{RecognizerTransport, SessionOptions};
use crate::ws::WsTransport;
use std::sync::Arc;
use tokio::sync::mpsc;
use voicepipe_core::config::RecognitionConfig;
use voicepipe_core::{AudioChunk, RecognitionError, RecognitionEvent};

/// One streaming exchange with the recognition engine per turn.
///
/// The session owns the options message and the credentialed transport;
/// both are read-only after construction and reused across turns.
pub struct RecognitionSession {
    transport: Arc<dyn RecognizerTransport>,
    options: SessionOptions,
}

impl RecognitionSession {
    pub fn new(config: &RecognitionConfig, transport: Arc<dyn RecognizerTransport>) -> Self {
        Self {
            transport,
            options: SessionOptions::from_config(config),
        }
    }

    /// Session backed by the production WebSocket transport.
    pub fn over_websocket(config: &RecognitionConfig) -> Self {
        let transport = Arc::new(WsTransport::new(&config.endpoint, &config.api_key));
        Self::new(config, transport)
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Send the options message followed by the chunk sequence and return
    /// the engine's event sequence. The returned receiver is single-pass;
    /// call again for the next turn.
    pub async fn stream_recognition(
        &self,
        audio_rx: mpsc::Receiver<AudioChunk>,
    ) -> Result<mpsc::UnboundedReceiver<RecognitionEvent>, RecognitionError> {
        self.transport.open_stream(&self.options, audio_rx).await
    }
}
