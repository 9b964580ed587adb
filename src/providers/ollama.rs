use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{GenerationOptions, Provider};

/// Ollama client for a local Ollama server
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Chat message object
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    role: String,
    /// Content of the message
    content: String,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Whether to stream the response
    stream: bool,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<ModelOptions>,
}

/// Model parameters for the Ollama API
#[derive(Debug, Serialize)]
struct ModelOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Chat response from the Ollama API
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// The generated message
    #[serde(default)]
    message: Option<ChatMessage>,
}

impl Ollama {
    /// Create a new Ollama client
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let endpoint = endpoint.into();
        let base_url = if endpoint.is_empty() {
            "http://localhost:11434".to_string()
        } else {
            endpoint.trim_end_matches('/').to_string()
        };

        Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Ollama API error ({}): {}", status, message);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Ollama response: {}", e)))
    }
}

#[async_trait]
impl Provider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: options.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            stream: false,
            options: Some(ModelOptions {
                temperature: Some(options.temperature),
                num_predict: Some(options.max_tokens),
            }),
        };

        let response = self.chat(request).await?;

        response
            .message
            .map(|m| m.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                ProviderError::ParseError("Ollama response contained no message".to_string())
            })
    }

    async fn test_connection(&self, options: &GenerationOptions) -> Result<(), ProviderError> {
        let request = ChatRequest {
            model: options.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            stream: false,
            options: Some(ModelOptions {
                temperature: None,
                num_predict: Some(10),
            }),
        };

        self.chat(request).await?;
        Ok(())
    }
}
