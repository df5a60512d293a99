use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use voicepipe_audio::AudioSource;
use voicepipe_core::{AppConfig, AudioError, RecognitionEvent};
use voicepipe_dialogue::{HttpResponseGenerator, ResponseDispatcher, UtteranceSegmenter};
use voicepipe_playback::{HttpSynthesizer, PlaybackSequencer};
use voicepipe_recognition::RecognitionSession;

#[derive(Parser)]
#[command(name = "voicepipe", about = "Turn-based voice interaction loop")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!("voicepipe starting");

    let mut source = voicepipe_audio::create_source(&config.audio)
        .context("failed to create audio source")?;
    source
        .open()
        .await
        .context("failed to open audio source")?;

    let session = RecognitionSession::over_websocket(&config.recognition);
    let generator = HttpResponseGenerator::new(&config.generator)
        .context("failed to build response generator client")?;
    let dispatcher = ResponseDispatcher::new(Box::new(generator), &config.dialogue);

    let synthesizer = HttpSynthesizer::new(&config.synthesis);
    let sink = voicepipe_playback::create_sink(&config.playback)
        .context("failed to create audio sink")?;
    let mut sequencer = PlaybackSequencer::new(Box::new(synthesizer), sink);
    sequencer
        .open()
        .await
        .context("failed to open audio sink")?;

    // Greet the caller before listening.
    if !config.dialogue.greeting_phrase.is_empty() {
        if let Err(e) = sequencer.play(&[config.dialogue.greeting_phrase.clone()]).await {
            tracing::warn!(error = %e, "greeting playback failed");
        }
    }

    let result = run_session(&config, source, &session, &dispatcher, &mut sequencer).await;

    sequencer.close().await;
    tracing::info!("voicepipe stopped");
    result
}

enum SessionOutcome {
    AudioEnded,
    EngineLost,
    Shutdown,
}

/// Run the interaction loop until the audio stream ends or shutdown is
/// requested. A lost recognition stream aborts the current turn only; the
/// stream is re-established and listening resumes.
async fn run_session(
    config: &AppConfig,
    mut source: Box<dyn AudioSource>,
    session: &RecognitionSession,
    dispatcher: &ResponseDispatcher,
    sequencer: &mut PlaybackSequencer,
) -> Result<()> {
    loop {
        let (chunk_tx, chunk_rx) = mpsc::channel(32);
        let shutdown = Arc::new(tokio::sync::Notify::new());
        let audio_ended = Arc::new(std::sync::atomic::AtomicBool::new(false));

        // Capture owns the source while the stream is up and hands it back
        // when the stream winds down, so a recognition failure does not
        // cost the audio connection.
        let capture_shutdown = Arc::clone(&shutdown);
        let capture_ended = Arc::clone(&audio_ended);
        let capture = tokio::spawn(async move {
            let mut source = source;
            loop {
                tokio::select! {
                    _ = capture_shutdown.notified() => break,
                    result = source.next_chunk() => match result {
                        Ok(chunk) => {
                            if chunk_tx.send(chunk).await.is_err() {
                                break;
                            }
                        }
                        Err(AudioError::StreamEnded) => {
                            tracing::info!("audio stream ended");
                            capture_ended.store(true, std::sync::atomic::Ordering::Relaxed);
                            break;
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "audio capture failed");
                            capture_ended.store(true, std::sync::atomic::Ordering::Relaxed);
                            break;
                        }
                    },
                }
            }
            source
        });

        let events = match session.stream_recognition(chunk_rx).await {
            Ok(events) => events,
            Err(e) => {
                shutdown.notify_waiters();
                source = capture.await.context("capture task panicked")?;
                source.close().await;
                return Err(e).context("failed to open recognition session");
            }
        };

        let outcome = drive_turns(config, events, dispatcher, sequencer, &audio_ended).await;

        shutdown.notify_waiters();
        source = capture.await.context("capture task panicked")?;

        match outcome {
            SessionOutcome::EngineLost => {
                tracing::info!("re-establishing recognition session");
            }
            SessionOutcome::AudioEnded | SessionOutcome::Shutdown => {
                source.close().await;
                return Ok(());
            }
        }
    }
}

/// The per-stream event loop: feed the segmenter, sleep until its pause
/// deadline, dispatch and play completed utterances.
async fn drive_turns(
    config: &AppConfig,
    mut events: mpsc::UnboundedReceiver<RecognitionEvent>,
    dispatcher: &ResponseDispatcher,
    sequencer: &mut PlaybackSequencer,
    audio_ended: &std::sync::atomic::AtomicBool,
) -> SessionOutcome {
    let mut segmenter =
        UtteranceSegmenter::new(Duration::from_millis(config.dialogue.pause_threshold_ms));
    segmenter.begin_turn();

    loop {
        let deadline = segmenter.deadline().map(tokio::time::Instant::from_std);
        let wake = deadline
            .unwrap_or_else(|| tokio::time::Instant::now() + Duration::from_secs(86400));

        tokio::select! {
            maybe_event = events.recv() => match maybe_event {
                Some(RecognitionEvent::SessionError(message)) => {
                    tracing::error!(%message, "recognition session error, turn aborted");
                    return SessionOutcome::EngineLost;
                }
                Some(event) => segmenter.on_event(&event, Instant::now()),
                None => {
                    if audio_ended.load(std::sync::atomic::Ordering::Relaxed) {
                        return SessionOutcome::AudioEnded;
                    }
                    tracing::warn!("recognition event stream closed unexpectedly");
                    return SessionOutcome::EngineLost;
                }
            },
            _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                let Some(utterance) = segmenter.take_ready(Instant::now()) else {
                    continue;
                };
                match dispatcher.dispatch(&utterance).await {
                    Ok(chunks) => {
                        if let Err(e) = sequencer.play(&chunks).await {
                            tracing::error!(error = %e, "playback failed");
                            return SessionOutcome::Shutdown;
                        }
                    }
                    // The turn ends without an answer; keep listening.
                    Err(e) => tracing::warn!(error = %e, "response generation failed"),
                }
                // Drop anything recognized while the response was playing.
                loop {
                    match events.try_recv() {
                        Ok(RecognitionEvent::SessionError(message)) => {
                            tracing::error!(%message, "recognition session error, turn aborted");
                            return SessionOutcome::EngineLost;
                        }
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }
                segmenter.playback_complete();
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                return SessionOutcome::Shutdown;
            }
        }
    }
}
