/// A fixed-size slice of raw audio bytes with its position within the turn.
///
/// Produced by an audio source and consumed exactly once by the recognition
/// session; `seq` is strictly increasing within a turn and resets to zero
/// when a new turn begins.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub data: Vec<u8>,
    pub seq: u64,
}

impl AudioChunk {
    pub fn new(data: Vec<u8>, seq: u64) -> Self {
        Self { data, seq }
    }
}

/// An event emitted by the recognition engine, in engine order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// An interim hypothesis; not accumulated.
    Partial(String),
    /// A finalized transcript span with ranked alternatives (best first).
    FinalRefinement { alternatives: Vec<String> },
    /// The engine or transport failed; terminates the event sequence.
    SessionError(String),
}

impl RecognitionEvent {
    /// The highest-ranked finalized text, if this is a final refinement.
    pub fn leading_alternative(&self) -> Option<&str> {
        match self {
            RecognitionEvent::FinalRefinement { alternatives } => {
                alternatives.first().map(String::as_str)
            }
            _ => None,
        }
    }
}
