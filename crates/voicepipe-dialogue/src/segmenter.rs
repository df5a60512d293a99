use std::time::{Duration, Instant};
use voicepipe_core::RecognitionEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    Idle,
    Accumulating,
    Dispatching,
}

/// Accumulates finalized transcript fragments and decides when the user has
/// finished speaking.
///
/// The pause threshold is a real timer: an utterance is ready only once the
/// threshold has elapsed with no new final fragment. The caller drives time
/// explicitly — it feeds events with `on_event`, sleeps until `deadline`,
/// and collects the utterance with `take_ready` — which keeps the state
/// machine free of clocks and trivially testable.
pub struct UtteranceSegmenter {
    state: SegmenterState,
    fragments: Vec<String>,
    last_fragment_at: Option<Instant>,
    pause_threshold: Duration,
}

impl UtteranceSegmenter {
    pub fn new(pause_threshold: Duration) -> Self {
        Self {
            state: SegmenterState::Idle,
            fragments: Vec::new(),
            last_fragment_at: None,
            pause_threshold,
        }
    }

    pub fn state(&self) -> SegmenterState {
        self.state
    }

    pub fn has_pending(&self) -> bool {
        !self.fragments.is_empty()
    }

    /// The turn begins: start accepting fragments with an empty buffer.
    pub fn begin_turn(&mut self) {
        self.state = SegmenterState::Accumulating;
        self.fragments.clear();
        self.last_fragment_at = None;
    }

    /// Feed one recognition event. Only final refinements accumulate; the
    /// leading (highest-ranked) alternative is kept.
    pub fn on_event(&mut self, event: &RecognitionEvent, now: Instant) {
        if self.state != SegmenterState::Accumulating {
            return;
        }
        if let Some(text) = event.leading_alternative() {
            self.fragments.push(text.to_string());
            self.last_fragment_at = Some(now);
        }
    }

    /// When the pause threshold elapses, if fragments are pending.
    pub fn deadline(&self) -> Option<Instant> {
        match (self.state, self.last_fragment_at) {
            (SegmenterState::Accumulating, Some(at)) if !self.fragments.is_empty() => {
                Some(at + self.pause_threshold)
            }
            _ => None,
        }
    }

    /// Hand over the utterance if the pause threshold has elapsed.
    ///
    /// Fragments are joined with single spaces and trimmed; a combined text
    /// that is empty or whitespace-only is silently discarded and the
    /// segmenter keeps accumulating.
    pub fn take_ready(&mut self, now: Instant) -> Option<String> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }

        let combined = self.fragments.join(" ");
        let combined = combined.trim();
        self.fragments.clear();
        self.last_fragment_at = None;

        if combined.is_empty() {
            return None;
        }
        self.state = SegmenterState::Dispatching;
        Some(combined.to_string())
    }

    /// Playback for the dispatched utterance finished; resume accumulating
    /// within the same recording session.
    pub fn playback_complete(&mut self) {
        if self.state == SegmenterState::Dispatching {
            self.state = SegmenterState::Accumulating;
        }
    }

    /// The session ended; return to idle and drop any pending fragments.
    pub fn reset(&mut self) {
        self.state = SegmenterState::Idle;
        self.fragments.clear();
        self.last_fragment_at = None;
    }
}
