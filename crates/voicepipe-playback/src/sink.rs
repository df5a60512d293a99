use async_trait::async_trait;
use voicepipe_core::PlaybackError;

/// A delivery target for synthesized audio segments.
///
/// Two variants exist: speaker output on the host machine and framed delivery
/// to a remote TCP client. Segments handed to [`deliver`](Self::deliver) must
/// reach the listener in call order.
#[async_trait]
pub trait AudioSink: Send {
    /// Returns the sink's variant name (e.g. `"local"`, `"tcp"`).
    fn name(&self) -> &str;
    /// Acquire the output resource (audio device or remote connection).
    async fn open(&mut self) -> Result<(), PlaybackError>;
    /// Deliver one complete audio segment. Blocks (asynchronously) until the
    /// segment has been handed off; delivery order is call order.
    async fn deliver(&mut self, segment: &[u8]) -> Result<(), PlaybackError>;
    /// Release the output resource. Safe to call more than once.
    async fn close(&mut self);
}
