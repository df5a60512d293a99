//! Turn management: utterance segmentation on recognition pauses, response
//! generation over HTTP, and chunking of the answer for ordered synthesis.

pub mod dispatcher;
pub mod generator;
pub mod segmenter;

pub use dispatcher::ResponseDispatcher;
pub use generator::{HttpResponseGenerator, ResponseGenerator, NO_CONTEXT_SENTINEL};
pub use segmenter::{SegmenterState, UtteranceSegmenter};
