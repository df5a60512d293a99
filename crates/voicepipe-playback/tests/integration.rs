use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use voicepipe_core::PlaybackError;
use voicepipe_playback::framing::read_frame;
use voicepipe_playback::{AudioSink, PlaybackSequencer, SpeechSynthesizer, TcpSink};

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn connect_with_retry(addr: String) -> TcpStream {
    for _ in 0..100 {
        if let Ok(stream) = TcpStream::connect(&addr).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("could not connect to {addr}");
}

#[tokio::test]
async fn test_tcp_sink_frames_arrive_in_order() {
    let port = free_port();
    let addr = format!("127.0.0.1:{port}");
    let mut sink = TcpSink::new(&addr, Duration::from_secs(5));

    let client_addr = addr.clone();
    let client = tokio::spawn(async move {
        let mut stream = connect_with_retry(client_addr).await;
        let mut frames = Vec::new();
        while let Some(frame) = read_frame(&mut stream).await.unwrap() {
            frames.push(frame);
        }
        frames
    });

    sink.open().await.unwrap();
    sink.deliver(b"first segment").await.unwrap();
    sink.deliver(b"second").await.unwrap();
    sink.deliver(b"third one").await.unwrap();
    sink.close().await;

    let frames = client.await.unwrap();
    assert_eq!(
        frames,
        vec![
            b"first segment".to_vec(),
            b"second".to_vec(),
            b"third one".to_vec()
        ]
    );
}

#[tokio::test]
async fn test_tcp_sink_large_segment_round_trip() {
    let port = free_port();
    let addr = format!("127.0.0.1:{port}");
    let mut sink = TcpSink::new(&addr, Duration::from_secs(5));

    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 241) as u8).collect();
    let expected = payload.clone();

    let client_addr = addr.clone();
    let client = tokio::spawn(async move {
        let mut stream = connect_with_retry(client_addr).await;
        read_frame(&mut stream).await.unwrap().unwrap()
    });

    sink.open().await.unwrap();
    sink.deliver(&payload).await.unwrap();
    sink.close().await;

    assert_eq!(client.await.unwrap(), expected);
}

#[tokio::test]
async fn test_tcp_sink_never_sends_empty_segments() {
    let port = free_port();
    let addr = format!("127.0.0.1:{port}");
    let mut sink = TcpSink::new(&addr, Duration::from_secs(5));

    let client_addr = addr.clone();
    let client = tokio::spawn(async move {
        let mut stream = connect_with_retry(client_addr).await;
        let mut frames = Vec::new();
        while let Some(frame) = read_frame(&mut stream).await.unwrap() {
            frames.push(frame);
        }
        frames
    });

    sink.open().await.unwrap();
    sink.deliver(b"").await.unwrap();
    sink.deliver(b"real audio").await.unwrap();
    sink.deliver(b"").await.unwrap();
    sink.close().await;

    // A zero-length frame would decode as an empty Vec; only the real
    // segment may appear.
    let frames = client.await.unwrap();
    assert_eq!(frames, vec![b"real audio".to_vec()]);
}

#[tokio::test]
async fn test_tcp_sink_close_idempotent_after_use() {
    let port = free_port();
    let addr = format!("127.0.0.1:{port}");
    let mut sink = TcpSink::new(&addr, Duration::from_secs(5));

    let client_addr = addr.clone();
    let client = tokio::spawn(async move {
        let _stream = connect_with_retry(client_addr).await;
    });

    sink.open().await.unwrap();
    client.await.unwrap();
    sink.close().await;
    sink.close().await;
    sink.close().await;
}

struct ScriptedSynthesizer {
    // Chunks whose text contains this marker fail to synthesize
    fail_marker: Option<String>,
    calls: AtomicUsize,
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, PlaybackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(PlaybackError::Synthesis("service unavailable".to_string()));
            }
        }
        Ok(format!("audio:{text}").into_bytes())
    }
}

#[derive(Default)]
struct RecordingSink {
    delivered: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_all: bool,
}

#[async_trait]
impl AudioSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    async fn open(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }

    async fn deliver(&mut self, segment: &[u8]) -> Result<(), PlaybackError> {
        if self.fail_all {
            return Err(PlaybackError::DeliverFailed("pipe broken".to_string()));
        }
        self.delivered.lock().unwrap().push(segment.to_vec());
        Ok(())
    }

    async fn close(&mut self) {}
}

#[tokio::test]
async fn test_sequencer_delivers_chunks_in_order() {
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = RecordingSink {
        delivered: Arc::clone(&delivered),
        fail_all: false,
    };
    let synth = ScriptedSynthesizer {
        fail_marker: None,
        calls: AtomicUsize::new(0),
    };
    let mut sequencer = PlaybackSequencer::new(Box::new(synth), Box::new(sink));

    sequencer.open().await.unwrap();
    sequencer
        .play(&["один".to_string(), "два".to_string(), "три".to_string()])
        .await
        .unwrap();
    sequencer.close().await;

    let delivered = delivered.lock().unwrap();
    assert_eq!(
        *delivered,
        vec![
            "audio:один".as_bytes().to_vec(),
            "audio:два".as_bytes().to_vec(),
            "audio:три".as_bytes().to_vec()
        ]
    );
}

#[tokio::test]
async fn test_sequencer_skips_chunk_whose_synthesis_fails() {
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = RecordingSink {
        delivered: Arc::clone(&delivered),
        fail_all: false,
    };
    let synth = ScriptedSynthesizer {
        fail_marker: Some("два".to_string()),
        calls: AtomicUsize::new(0),
    };
    let mut sequencer = PlaybackSequencer::new(Box::new(synth), Box::new(sink));

    sequencer.open().await.unwrap();
    sequencer
        .play(&["один".to_string(), "два".to_string(), "три".to_string()])
        .await
        .unwrap();

    let delivered = delivered.lock().unwrap();
    assert_eq!(
        *delivered,
        vec![
            "audio:один".as_bytes().to_vec(),
            "audio:три".as_bytes().to_vec()
        ]
    );
}

#[tokio::test]
async fn test_sequencer_sink_failure_ends_response() {
    let sink = RecordingSink {
        delivered: Arc::new(Mutex::new(Vec::new())),
        fail_all: true,
    };
    let synth = ScriptedSynthesizer {
        fail_marker: None,
        calls: AtomicUsize::new(0),
    };
    let mut sequencer = PlaybackSequencer::new(Box::new(synth), Box::new(sink));

    sequencer.open().await.unwrap();
    match sequencer.play(&["один".to_string(), "два".to_string()]).await {
        Err(PlaybackError::DeliverFailed(_)) => {}
        other => panic!("expected DeliverFailed, got {other:?}"),
    }
}
