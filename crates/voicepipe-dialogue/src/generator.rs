use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use voicepipe_core::config::GeneratorConfig;
use voicepipe_core::DispatchError;

/// Reserved generator output meaning "no grounded answer was found".
pub const NO_CONTEXT_SENTINEL: &str = "NO_CONTEXT";

/// The narrow boundary to the external response generator.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, utterance: &str) -> Result<String, DispatchError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// HTTP implementation: POST `{"text": …}`, expect `{"response": …}`.
///
/// The request timeout bounds the whole call; a timeout or transport
/// failure surfaces as `GenerationUnavailable`.
pub struct HttpResponseGenerator {
    client: reqwest::Client,
    url: String,
}

impl HttpResponseGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DispatchError::GenerationUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl ResponseGenerator for HttpResponseGenerator {
    async fn generate(&self, utterance: &str) -> Result<String, DispatchError> {
        let response = self
            .client
            .post(&self.url)
            .json(&GenerateRequest { text: utterance })
            .send()
            .await
            .map_err(|e| DispatchError::GenerationUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::GenerationUnavailable(format!(
                "generator returned HTTP {status}"
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DispatchError::GenerationUnavailable(e.to_string()))?;
        Ok(body.response)
    }
}
