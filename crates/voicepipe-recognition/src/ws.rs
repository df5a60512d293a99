use crate::transport::{RecognizerTransport, SessionOptions, WireEvent};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::connect_async;
use voicepipe_core::{AudioChunk, RecognitionError, RecognitionEvent};

/// WebSocket transport to the recognition engine.
///
/// Connects over TLS with the API key in the handshake headers, writes the
/// options message as the first text frame and audio chunks as binary
/// frames, and parses inbound text frames as [`WireEvent`]s. The send and
/// receive sides run as independent tasks so events can arrive while audio
/// is still being sent.
pub struct WsTransport {
    endpoint: String,
    api_key: String,
}

impl WsTransport {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

fn map_connect_error(err: WsError) -> RecognitionError {
    match err {
        WsError::Http(response) if response.status().as_u16() == 401
            || response.status().as_u16() == 403 =>
        {
            RecognitionError::Authentication(format!(
                "engine rejected credential: HTTP {}",
                response.status()
            ))
        }
        other => RecognitionError::ConnectionUnavailable(other.to_string()),
    }
}

#[async_trait]
impl RecognizerTransport for WsTransport {
    async fn open_stream(
        &self,
        options: &SessionOptions,
        mut audio_rx: mpsc::Receiver<AudioChunk>,
    ) -> Result<mpsc::UnboundedReceiver<RecognitionEvent>, RecognitionError> {
        let mut request = self
            .endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| RecognitionError::ConnectionUnavailable(e.to_string()))?;
        let credential = format!("Api-Key {}", self.api_key);
        request.headers_mut().insert(
            "authorization",
            HeaderValue::from_str(&credential)
                .map_err(|e| RecognitionError::Authentication(e.to_string()))?,
        );

        let (ws, _response) = connect_async(request).await.map_err(map_connect_error)?;
        tracing::debug!(endpoint = %self.endpoint, "recognition stream connected");

        let (mut sink, mut stream) = ws.split();

        // Options message goes out before any audio.
        let options_json = serde_json::to_string(options)
            .map_err(|e| RecognitionError::Stream(e.to_string()))?;
        sink.send(Message::Text(options_json))
            .await
            .map_err(|e| RecognitionError::Stream(e.to_string()))?;

        // Send side: forward chunks as they are produced, then close.
        tokio::spawn(async move {
            while let Some(chunk) = audio_rx.recv().await {
                if let Err(e) = sink.send(Message::Binary(chunk.data)).await {
                    tracing::debug!("audio send side closed: {e}");
                    return;
                }
            }
            let _ = sink.send(Message::Close(None)).await;
        });

        // Receive side: drain engine events in arrival order.
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => match serde_json::from_str::<WireEvent>(&text) {
                        Ok(event) => {
                            if event_tx.send(event.into()).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!("discarding unparseable recognition event: {e}");
                        }
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        let _ = event_tx.send(RecognitionEvent::SessionError(e.to_string()));
                        break;
                    }
                }
            }
        });

        Ok(event_rx)
    }
}
