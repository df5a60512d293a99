use crate::source::AudioSource;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use voicepipe_core::{AudioChunk, AudioError};

/// Network variant of [`AudioSource`]: accepts a single inbound connection
/// and reads raw unframed chunks from it.
///
/// A short read only means fewer bytes were available; reading continues
/// until the chunk is full. A zero-length read is the true end of stream.
pub struct TcpSource {
    listen_addr: String,
    accept_timeout: Duration,
    chunk_size: usize,
    stream: Option<TcpStream>,
    seq: u64,
    ended: bool,
}

impl TcpSource {
    pub fn new(listen_addr: &str, accept_timeout: Duration, chunk_size: usize) -> Self {
        Self {
            listen_addr: listen_addr.to_string(),
            accept_timeout,
            chunk_size,
            stream: None,
            seq: 0,
            ended: false,
        }
    }
}

#[async_trait]
impl AudioSource for TcpSource {
    fn name(&self) -> &str {
        "tcp"
    }

    async fn open(&mut self) -> Result<(), AudioError> {
        let listener = TcpListener::bind(&self.listen_addr)
            .await
            .map_err(|e| AudioError::ConnectionUnavailable(e.to_string()))?;
        tracing::info!(addr = %self.listen_addr, "waiting for inbound audio stream");

        let (stream, peer) = tokio::time::timeout(self.accept_timeout, listener.accept())
            .await
            .map_err(|_| {
                AudioError::ConnectionUnavailable(format!(
                    "no peer connected within {:?}",
                    self.accept_timeout
                ))
            })?
            .map_err(|e| AudioError::ConnectionUnavailable(e.to_string()))?;

        tracing::info!(%peer, "audio stream connected");
        self.stream = Some(stream);
        self.seq = 0;
        self.ended = false;
        Ok(())
    }

    async fn next_chunk(&mut self) -> Result<AudioChunk, AudioError> {
        if self.ended {
            return Err(AudioError::StreamEnded);
        }
        let stream = self.stream.as_mut().ok_or_else(|| {
            AudioError::ConnectionUnavailable("source not open".to_string())
        })?;

        let mut buf = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < self.chunk_size {
            match stream.read(&mut buf[filled..]).await {
                Ok(0) => {
                    self.ended = true;
                    if filled == 0 {
                        return Err(AudioError::StreamEnded);
                    }
                    // Deliver the final short chunk; StreamEnded follows on
                    // the next call.
                    buf.truncate(filled);
                    break;
                }
                Ok(n) => filled += n,
                Err(e) => {
                    tracing::debug!("audio stream read failed: {e}");
                    self.ended = true;
                    return Err(AudioError::StreamEnded);
                }
            }
        }

        let seq = self.seq;
        self.seq += 1;
        Ok(AudioChunk::new(buf, seq))
    }

    async fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("audio stream closed");
        }
    }
}
