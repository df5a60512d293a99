pub mod device;
pub mod source;
pub mod tcp;

pub use device::DeviceSource;
pub use source::AudioSource;
pub use tcp::TcpSource;

use std::time::Duration;
use voicepipe_core::config::AudioConfig;
use voicepipe_core::AudioError;

/// Create the audio source variant selected by configuration.
pub fn create_source(config: &AudioConfig) -> Result<Box<dyn AudioSource>, AudioError> {
    match config.source.as_str() {
        "device" => Ok(Box::new(DeviceSource::new(
            &config.device_name,
            config.chunk_size,
        ))),
        "tcp" => Ok(Box::new(TcpSource::new(
            &config.listen_addr,
            Duration::from_secs(config.accept_timeout_secs),
            config.chunk_size,
        ))),
        other => Err(AudioError::SourceNotFound(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_source_device() {
        let config = AudioConfig::default();
        let source = create_source(&config).unwrap();
        assert_eq!(source.name(), "device");
    }

    #[test]
    fn test_create_source_tcp() {
        let config = AudioConfig {
            source: "tcp".to_string(),
            ..AudioConfig::default()
        };
        let source = create_source(&config).unwrap();
        assert_eq!(source.name(), "tcp");
    }

    #[test]
    fn test_create_source_unknown_fails() {
        let config = AudioConfig {
            source: "carrier-pigeon".to_string(),
            ..AudioConfig::default()
        };
        match create_source(&config) {
            Err(AudioError::SourceNotFound(name)) => assert_eq!(name, "carrier-pigeon"),
            _ => panic!("expected SourceNotFound"),
        }
    }
}
