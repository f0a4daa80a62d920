use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::app_config::TranslationConfig;
use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::TranslationBackend;

/// Ollama client for interacting with the Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name used for generation
    model: String,
    /// System prompt template with language placeholders
    system_prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize)]
struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize)]
struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Deserialize)]
struct GenerationResponse {
    /// Generated text
    #[serde(default)]
    response: String,
}

impl Ollama {
    /// Create a new Ollama client from configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        let timeout = Duration::from_secs(config.get_timeout_secs());
        Self {
            base_url: normalize_endpoint(&config.get_endpoint()),
            client: Client::builder()
                .timeout(timeout)
                // Ollama speaks HTTP/1.1; keep connections alive between chunks
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            model: config.get_model(),
            system_prompt: config.common.system_prompt.clone(),
            temperature: config.common.temperature,
            max_retries: config.common.retry_count,
            backoff_base_ms: config.common.retry_backoff_ms,
        }
    }

    /// Generate text from the Ollama API with retry logic
    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            let response_result = self.client.post(&url).json(&request).send().await;

            match response_result {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await.map_err(|e| {
                            ProviderError::ParseError(format!(
                                "Failed to read Ollama response body: {}",
                                e
                            ))
                        })?;
                        return extract_response_text(&body);
                    } else if status.is_server_error() {
                        // Server error - can retry
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        error!(
                            "Ollama API error ({}): {} - attempt {}/{}",
                            status,
                            error_text,
                            attempt + 1,
                            self.max_retries + 1
                        );
                        last_error = Some(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: error_text,
                        });
                    } else {
                        // Client error - don't retry
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        error!("Ollama API error ({}): {}", status, error_text);
                        return Err(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: error_text,
                        });
                    }
                }
                Err(e) => {
                    // Network error - can retry
                    error!(
                        "Ollama API network error: {} - attempt {}/{}",
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::ConnectionError(e.to_string()));
                }
            }

            attempt += 1;
            if attempt <= self.max_retries {
                let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!(
                "Ollama API request failed after {} attempts",
                self.max_retries + 1
            ))
        }))
    }
}

/// Parse the Ollama response body, tolerating JSONL streaming output.
fn extract_response_text(body: &str) -> Result<String, ProviderError> {
    // Most responses are a single JSON object
    if let Ok(parsed) = serde_json::from_str::<GenerationResponse>(body) {
        return Ok(parsed.response);
    }

    // The response might be in JSONL format (streaming): concatenate the
    // "response" field of every line that parses
    let mut full_response = String::new();
    let mut parsed_any = false;
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(line) {
            parsed_any = true;
            if let Some(part) = value.get("response").and_then(|v| v.as_str()) {
                full_response.push_str(part);
            }
        }
    }
    if parsed_any {
        return Ok(full_response);
    }

    let preview: String = body.chars().take(200).collect();
    Err(ProviderError::ParseError(format!(
        "Response contains invalid JSON: {}",
        preview
    )))
}

/// Normalize an endpoint into a scheme-qualified base URL without a trailing
/// slash, falling back to the default local server for unusable input.
fn normalize_endpoint(endpoint: &str) -> String {
    let candidate = if endpoint.trim().is_empty() {
        "http://localhost:11434".to_string()
    } else if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{}", endpoint)
    };

    match Url::parse(&candidate) {
        Ok(url) => {
            let host = url.host_str().unwrap_or("localhost");
            let port = url
                .port()
                .unwrap_or(if url.scheme() == "https" { 443 } else { 11434 });
            format!("{}://{}:{}", url.scheme(), host, port)
        }
        Err(_) => "http://localhost:11434".to_string(),
    }
}

#[async_trait]
impl TranslationBackend for Ollama {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let system = self
            .system_prompt
            .replace("{source_language}", &language_utils::language_name(source_language))
            .replace("{target_language}", &language_utils::language_name(target_language));

        debug!(
            "Ollama request: {} chars, {} -> {}",
            text.len(),
            source_language,
            target_language
        );

        let request = GenerationRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
            system: Some(system),
            options: Some(GenerationOptions {
                temperature: Some(self.temperature),
            }),
            stream: false,
        };

        let response = self.generate(request).await?;
        Ok(response.trim().to_string())
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to connect to Ollama: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "Ollama version endpoint returned an error".to_string(),
            })
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
