use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("connection unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("audio stream ended")]
    StreamEnded,

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("failed to build stream: {0}")]
    StreamBuild(String),

    #[error("audio source not found: {0}")]
    SourceNotFound(String),
}

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("connection unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("recognition stream failed: {0}")]
    Stream(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("response generation unavailable: {0}")]
    GenerationUnavailable(String),
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("synthesis failed: {0}")]
    Synthesis(String),

    #[error("connection unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("failed to deliver segment: {0}")]
    DeliverFailed(String),

    #[error("failed to decode clip: {0}")]
    Decode(String),

    #[error("audio sink not found: {0}")]
    SinkNotFound(String),
}
