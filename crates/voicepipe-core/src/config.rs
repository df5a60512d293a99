use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub recognition: RecognitionConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub synthesis: SynthesisConfig,

    #[serde(default)]
    pub dialogue: DialogueConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AudioConfig {
    /// Which audio source variant to use: "device" or "tcp".
    #[serde(default = "default_source")]
    pub source: String,

    #[serde(default = "default_device_name")]
    pub device_name: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_channels")]
    pub channels: u16,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Bind address for the "tcp" source variant.
    #[serde(default = "default_capture_addr")]
    pub listen_addr: String,

    #[serde(default = "default_accept_timeout_secs")]
    pub accept_timeout_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            device_name: default_device_name(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            chunk_size: default_chunk_size(),
            listen_addr: default_capture_addr(),
            accept_timeout_secs: default_accept_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecognitionConfig {
    #[serde(default = "default_recognition_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_true")]
    pub profanity_filter: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_recognition_endpoint(),
            api_key: String::new(),
            language: default_language(),
            profanity_filter: default_true(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    #[serde(default = "default_generator_url")]
    pub url: String,

    #[serde(default = "default_generator_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            url: default_generator_url(),
            timeout_secs: default_generator_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SynthesisConfig {
    #[serde(default = "default_synthesis_endpoint")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_voice")]
    pub voice: String,

    #[serde(default = "default_role")]
    pub role: String,

    #[serde(default = "default_speed")]
    pub speed: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_synthesis_endpoint(),
            api_key: String::new(),
            voice: default_voice(),
            role: default_role(),
            speed: default_speed(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DialogueConfig {
    /// Dispatch fires once this much silence follows the last final fragment.
    #[serde(default = "default_pause_threshold_ms")]
    pub pause_threshold_ms: u64,

    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    #[serde(default = "default_greeting")]
    pub greeting_phrase: String,

    #[serde(default = "default_rephrase")]
    pub rephrase_phrase: String,

    #[serde(default = "default_closing")]
    pub closing_phrase: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            pause_threshold_ms: default_pause_threshold_ms(),
            max_chunk_chars: default_max_chunk_chars(),
            greeting_phrase: default_greeting(),
            rephrase_phrase: default_rephrase(),
            closing_phrase: default_closing(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaybackConfig {
    /// Which audio sink variant to use: "local" or "tcp".
    #[serde(default = "default_sink")]
    pub sink: String,

    /// Bind address for the "tcp" sink variant.
    #[serde(default = "default_playback_addr")]
    pub listen_addr: String,

    #[serde(default = "default_accept_timeout_secs")]
    pub accept_timeout_secs: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            listen_addr: default_playback_addr(),
            accept_timeout_secs: default_accept_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_source() -> String {
    "device".to_string()
}

fn default_device_name() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    8000
}

fn default_channels() -> u16 {
    1
}

fn default_chunk_size() -> usize {
    4096
}

fn default_capture_addr() -> String {
    "0.0.0.0:12345".to_string()
}

fn default_accept_timeout_secs() -> u64 {
    30
}

fn default_recognition_endpoint() -> String {
    "wss://stt.example.net/v3/recognize".to_string()
}

fn default_language() -> String {
    "ru-RU".to_string()
}

fn default_true() -> bool {
    true
}

fn default_generator_url() -> String {
    "http://127.0.0.1:8000/process_text".to_string()
}

fn default_generator_timeout_secs() -> u64 {
    60
}

fn default_synthesis_endpoint() -> String {
    "https://tts.example.net/v3/synthesize".to_string()
}

fn default_voice() -> String {
    "zhanar_ru".to_string()
}

fn default_role() -> String {
    "friendly".to_string()
}

fn default_speed() -> f32 {
    1.0
}

fn default_pause_threshold_ms() -> u64 {
    1000
}

fn default_max_chunk_chars() -> usize {
    250
}

fn default_greeting() -> String {
    "Здравствуйте! Чем я могу помочь?".to_string()
}

fn default_rephrase() -> String {
    "Пожалуйста, сформулируйте вопрос по-другому.".to_string()
}

fn default_closing() -> String {
    "Могу я чем-то еще помочь?".to_string()
}

fn default_sink() -> String {
    "local".to_string()
}

fn default_playback_addr() -> String {
    "0.0.0.0:23456".to_string()
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = input.to_string();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                return Err(ConfigError::EnvVarNotFound(var_name.to_string()));
            }
        }
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let interpolated = interpolate_env_vars(&content)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (for testing).
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }
}
