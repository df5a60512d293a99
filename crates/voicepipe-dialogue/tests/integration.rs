use std::time::{Duration, Instant};

use async_trait::async_trait;
use voicepipe_core::config::DialogueConfig;
use voicepipe_core::{DispatchError, RecognitionEvent};
use voicepipe_dialogue::{
    ResponseDispatcher, ResponseGenerator, SegmenterState, UtteranceSegmenter, NO_CONTEXT_SENTINEL,
};

struct EchoGenerator;

#[async_trait]
impl ResponseGenerator for EchoGenerator {
    async fn generate(&self, utterance: &str) -> Result<String, DispatchError> {
        Ok(format!("Вы спросили: {utterance}."))
    }
}

struct SentinelGenerator;

#[async_trait]
impl ResponseGenerator for SentinelGenerator {
    async fn generate(&self, _utterance: &str) -> Result<String, DispatchError> {
        Ok(NO_CONTEXT_SENTINEL.to_string())
    }
}

fn final_event(text: &str) -> RecognitionEvent {
    RecognitionEvent::FinalRefinement {
        alternatives: vec![text.to_string()],
    }
}

fn segmenter() -> UtteranceSegmenter {
    UtteranceSegmenter::new(Duration::from_millis(1000))
}

#[tokio::test]
async fn test_fragments_accumulate_into_one_dispatch() {
    let mut seg = segmenter();
    seg.begin_turn();

    let t0 = Instant::now();
    seg.on_event(&RecognitionEvent::Partial("когда".to_string()), t0);
    seg.on_event(&final_event("когда поезд"), t0 + Duration::from_millis(100));
    seg.on_event(
        &final_event("до Астаны"),
        t0 + Duration::from_millis(400),
    );

    // Pause not yet elapsed
    assert!(seg.take_ready(t0 + Duration::from_millis(900)).is_none());

    let utterance = seg
        .take_ready(t0 + Duration::from_millis(1500))
        .expect("pause elapsed");
    assert_eq!(utterance, "когда поезд до Астаны");
    assert_eq!(seg.state(), SegmenterState::Dispatching);

    let dispatcher = ResponseDispatcher::new(Box::new(EchoGenerator), &DialogueConfig::default());
    let chunks = dispatcher.dispatch(&utterance).await.unwrap();
    assert_eq!(chunks[0], "Вы спросили: когда поезд до Астаны.");
    assert_eq!(
        *chunks.last().unwrap(),
        DialogueConfig::default().closing_phrase
    );

    seg.playback_complete();
    assert_eq!(seg.state(), SegmenterState::Accumulating);
}

#[tokio::test]
async fn test_events_during_dispatch_do_not_leak_into_next_turn() {
    let mut seg = segmenter();
    seg.begin_turn();

    let t0 = Instant::now();
    seg.on_event(&final_event("первый вопрос"), t0);
    let first = seg.take_ready(t0 + Duration::from_secs(2)).unwrap();
    assert_eq!(first, "первый вопрос");

    // Recognition keeps emitting while the answer plays; those fragments
    // belong to nobody and are dropped.
    seg.on_event(&final_event("шум во время ответа"), t0 + Duration::from_secs(3));
    seg.playback_complete();

    seg.on_event(&final_event("второй вопрос"), t0 + Duration::from_secs(10));
    let second = seg.take_ready(t0 + Duration::from_secs(12)).unwrap();
    assert_eq!(second, "второй вопрос");
}

#[tokio::test]
async fn test_sentinel_response_asks_to_rephrase_without_closing() {
    let dispatcher =
        ResponseDispatcher::new(Box::new(SentinelGenerator), &DialogueConfig::default());
    let chunks = dispatcher.dispatch("что-то невнятное").await.unwrap();
    assert_eq!(chunks, vec![DialogueConfig::default().rephrase_phrase]);
}

#[tokio::test]
async fn test_whitespace_only_utterance_never_dispatched() {
    let mut seg = segmenter();
    seg.begin_turn();

    let t0 = Instant::now();
    seg.on_event(&final_event("   "), t0);
    assert!(seg.take_ready(t0 + Duration::from_secs(5)).is_none());
    assert_eq!(seg.state(), SegmenterState::Accumulating);
}
