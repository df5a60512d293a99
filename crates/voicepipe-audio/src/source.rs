use async_trait::async_trait;
use voicepipe_core::{AudioChunk, AudioError};

/// A source of fixed-size raw audio chunks for one recording session.
///
/// Two variants share this contract: a local capture device and a
/// single-connection network byte stream, selected by configuration via
/// [`create_source`](crate::create_source).
#[async_trait]
pub trait AudioSource: Send {
    /// Returns the source variant name (e.g. `"device"`, `"tcp"`).
    fn name(&self) -> &str;

    /// Acquire the underlying device, or accept one inbound connection.
    ///
    /// Fails with [`AudioError::ConnectionUnavailable`] if the device cannot
    /// be claimed or no peer connects within the configured timeout. Resets
    /// the chunk sequence to zero.
    async fn open(&mut self) -> Result<(), AudioError>;

    /// Block until a full chunk is available and return it.
    ///
    /// Chunk sequence numbers are strictly increasing with no gaps. Fails
    /// with [`AudioError::StreamEnded`] once the underlying source closes;
    /// no further chunks are produced after that.
    async fn next_chunk(&mut self) -> Result<AudioChunk, AudioError>;

    /// Release the device or socket. Idempotent; safe on every exit path.
    async fn close(&mut self);
}
