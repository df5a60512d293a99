//! Length-prefixed framing for audio segments sent over TCP.
//!
//! Each frame is a 4-byte big-endian payload length followed by the payload.

use tokio::io::{AsyncRead, AsyncReadExt};
use voicepipe_core::PlaybackError;

pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Read one complete frame. Returns `None` on a clean end of stream before
/// the length prefix.
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Option<Vec<u8>>, PlaybackError> {
    let mut prefix = [0u8; 4];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(PlaybackError::DeliverFailed(e.to_string())),
    }

    let len = u32::from_be_bytes(prefix) as usize;
    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| PlaybackError::DeliverFailed(e.to_string()))?;
    Ok(Some(payload))
}
