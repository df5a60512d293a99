use crate::source::AudioSource;
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Device;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use voicepipe_core::{AudioChunk, AudioError};

/// Local capture device variant of [`AudioSource`].
///
/// The cpal stream lives on a dedicated thread (cpal streams are not `Send`);
/// its callback converts the device's native f32 samples to 16-bit PCM bytes
/// and hands them to the async side over a channel. `next_chunk` assembles
/// those blocks into fixed-size chunks.
pub struct DeviceSource {
    device_name: String,
    chunk_size: usize,
    rx: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
    stop: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
    pending: Vec<u8>,
    seq: u64,
    ended: bool,
}

impl DeviceSource {
    pub fn new(device_name: &str, chunk_size: usize) -> Self {
        Self {
            device_name: device_name.to_string(),
            chunk_size,
            rx: None,
            stop: Arc::new(AtomicBool::new(false)),
            thread: None,
            pending: Vec::new(),
            seq: 0,
            ended: false,
        }
    }
}

fn find_input_device(host: &cpal::Host, name: &str) -> Result<Device, AudioError> {
    if name == "default" {
        return host
            .default_input_device()
            .ok_or_else(|| AudioError::DeviceNotFound("no default input device".to_string()));
    }

    let devices = host
        .input_devices()
        .map_err(|e| AudioError::DeviceNotFound(e.to_string()))?;
    for device in devices {
        if device.name().map(|n| n == name).unwrap_or(false) {
            return Ok(device);
        }
    }
    Err(AudioError::DeviceNotFound(format!(
        "input device not found: {name}"
    )))
}

fn run_capture(
    device_name: String,
    tx: mpsc::UnboundedSender<Vec<u8>>,
    ready_tx: oneshot::Sender<Result<(), AudioError>>,
    stop: Arc<AtomicBool>,
) {
    let host = cpal::default_host();
    let device = match find_input_device(&host, &device_name) {
        Ok(d) => d,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    let config = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready_tx.send(Err(AudioError::ConnectionUnavailable(e.to_string())));
            return;
        }
    };

    let failed = Arc::new(AtomicBool::new(false));
    let failed_flag = Arc::clone(&failed);
    let err_callback = move |err: cpal::StreamError| {
        tracing::error!("capture stream error: {}", err);
        failed_flag.store(true, Ordering::Relaxed);
    };

    let stream = device.build_input_stream(
        &config.config(),
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let mut bytes = Vec::with_capacity(data.len() * 2);
            for &sample in data {
                let v = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            let _ = tx.send(bytes);
        },
        err_callback,
        None,
    );

    let stream = match stream {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(AudioError::StreamBuild(e.to_string())));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(AudioError::ConnectionUnavailable(e.to_string())));
        return;
    }
    let _ = ready_tx.send(Ok(()));

    while !stop.load(Ordering::Relaxed) && !failed.load(Ordering::Relaxed) {
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    // Dropping the stream drops the callback and with it the sender,
    // which closes the channel and surfaces StreamEnded to the reader.
    drop(stream);
}

#[async_trait]
impl AudioSource for DeviceSource {
    fn name(&self) -> &str {
        "device"
    }

    async fn open(&mut self) -> Result<(), AudioError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        self.stop.store(false, Ordering::Relaxed);
        let stop = Arc::clone(&self.stop);
        let device_name = self.device_name.clone();

        let handle = std::thread::spawn(move || run_capture(device_name, tx, ready_tx, stop));

        match ready_rx.await {
            Ok(Ok(())) => {
                self.thread = Some(handle);
                self.rx = Some(rx);
                self.pending.clear();
                self.seq = 0;
                self.ended = false;
                tracing::debug!(device = %self.device_name, "capture device opened");
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(AudioError::ConnectionUnavailable(
                    "capture thread exited before ready".to_string(),
                ))
            }
        }
    }

    async fn next_chunk(&mut self) -> Result<AudioChunk, AudioError> {
        if self.ended {
            return Err(AudioError::StreamEnded);
        }
        let rx = self.rx.as_mut().ok_or_else(|| {
            AudioError::ConnectionUnavailable("source not open".to_string())
        })?;

        while self.pending.len() < self.chunk_size {
            match rx.recv().await {
                Some(bytes) => self.pending.extend_from_slice(&bytes),
                None => {
                    self.ended = true;
                    return Err(AudioError::StreamEnded);
                }
            }
        }

        let data: Vec<u8> = self.pending.drain(..self.chunk_size).collect();
        let seq = self.seq;
        self.seq += 1;
        Ok(AudioChunk::new(data, seq))
    }

    async fn close(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
            tracing::debug!("capture device closed");
        }
        self.rx = None;
    }
}
