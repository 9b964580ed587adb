use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{GenerationOptions, Provider};

/// Anthropic client for the Messages API
#[derive(Debug)]
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to the public API)
    endpoint: String,
}

/// Anthropic messages request
#[derive(Debug, Serialize)]
struct MessagesRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<Message>,

    /// System prompt to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize)]
struct Message {
    /// Role of the message sender (user, assistant)
    role: String,

    /// Content of the message
    content: String,
}

/// Anthropic messages response
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    /// The content blocks of the response
    content: Vec<ContentBlock>,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
struct ContentBlock {
    /// The type of content
    #[serde(rename = "type")]
    content_type: String,

    /// The actual text content
    #[serde(default)]
    text: String,
}

impl Anthropic {
    /// Create a new Anthropic client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
        }
    }

    async fn complete(&self, request: MessagesRequest) -> Result<MessagesResponse, ProviderError> {
        let response = self
            .client
            .post(self.api_url())
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Anthropic request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Anthropic API error ({}): {}", status, message);

            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(ProviderError::AuthenticationError(message));
            }
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Anthropic response: {}", e)))
    }
}

#[async_trait]
impl Provider for Anthropic {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let request = MessagesRequest {
            model: options.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            system: Some(system.to_string()),
            temperature: Some(options.temperature),
            max_tokens: options.max_tokens,
        };

        let response = self.complete(request).await?;

        let text: String = response
            .content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect();

        if text.is_empty() {
            return Err(ProviderError::ParseError(
                "Anthropic response contained no text content".to_string(),
            ));
        }

        Ok(text)
    }

    async fn test_connection(&self, options: &GenerationOptions) -> Result<(), ProviderError> {
        let request = MessagesRequest {
            model: options.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            system: None,
            temperature: None,
            max_tokens: 10,
        };

        self.complete(request).await?;
        Ok(())
    }
}
