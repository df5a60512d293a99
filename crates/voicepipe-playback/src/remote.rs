use crate::framing::encode_frame;
use crate::sink::AudioSink;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use voicepipe_core::PlaybackError;

/// Network variant of [`AudioSink`]: accepts a single inbound connection and
/// writes each segment as a length-prefixed frame.
pub struct TcpSink {
    listen_addr: String,
    accept_timeout: Duration,
    stream: Option<TcpStream>,
}

impl TcpSink {
    pub fn new(listen_addr: &str, accept_timeout: Duration) -> Self {
        Self {
            listen_addr: listen_addr.to_string(),
            accept_timeout,
            stream: None,
        }
    }
}

#[async_trait]
impl AudioSink for TcpSink {
    fn name(&self) -> &str {
        "tcp"
    }

    async fn open(&mut self) -> Result<(), PlaybackError> {
        let listener = TcpListener::bind(&self.listen_addr)
            .await
            .map_err(|e| PlaybackError::ConnectionUnavailable(e.to_string()))?;
        tracing::info!(addr = %self.listen_addr, "waiting for playback client");

        let (stream, peer) = tokio::time::timeout(self.accept_timeout, listener.accept())
            .await
            .map_err(|_| {
                PlaybackError::ConnectionUnavailable(format!(
                    "no playback client within {:?}",
                    self.accept_timeout
                ))
            })?
            .map_err(|e| PlaybackError::ConnectionUnavailable(e.to_string()))?;

        tracing::info!(%peer, "playback client connected");
        self.stream = Some(stream);
        Ok(())
    }

    async fn deliver(&mut self, segment: &[u8]) -> Result<(), PlaybackError> {
        if segment.is_empty() {
            tracing::debug!("skipping zero-length segment");
            return Ok(());
        }
        let stream = self.stream.as_mut().ok_or_else(|| {
            PlaybackError::ConnectionUnavailable("sink not open".to_string())
        })?;

        stream
            .write_all(&encode_frame(segment))
            .await
            .map_err(|e| PlaybackError::DeliverFailed(e.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|e| PlaybackError::DeliverFailed(e.to_string()))?;
        Ok(())
    }

    async fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("playback connection closed");
        }
    }
}
