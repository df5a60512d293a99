pub mod config;
pub mod error;
pub mod text;
pub mod types;

pub use config::AppConfig;
pub use error::{AudioError, ConfigError, DispatchError, PlaybackError, RecognitionError};
pub use types::{AudioChunk, RecognitionEvent};
