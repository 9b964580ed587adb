/*!
 * Provider implementations for different translation services.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration
 * - Anthropic: Anthropic API integration
 *
 * All providers are stateless request/response clients behind the `Provider`
 * trait: one text-generation capability, fallible, with no structure assumed
 * of the returned text.
 */

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

/// Options applied to a single generation request
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Model name to use
    pub model: String,
    /// Sampling temperature (0.0 to 1.0)
    pub temperature: f32,
    /// Maximum number of output tokens
    pub max_tokens: u32,
}

/// Common trait for all LLM providers
///
/// Implementations own their credentials and endpoint; callers supply the
/// prompts and per-request generation options.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Provider identifier for logging and reporting
    fn name(&self) -> &str;

    /// Generate text from a system prompt and a user request
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The generated text, or a single
    ///   failure signal with no recovery attempted by the client itself
    async fn generate(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self, options: &GenerationOptions) -> Result<(), ProviderError>;
}

/// Build the configured provider client.
pub fn create_provider(config: &TranslationConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let endpoint = config.get_endpoint();
    let api_key = config.get_api_key();
    let timeout_secs = config.get_timeout_secs();

    match config.provider {
        TranslationProvider::Ollama => {
            Ok(Arc::new(ollama::Ollama::new(endpoint, timeout_secs)))
        }
        TranslationProvider::OpenAI => {
            Ok(Arc::new(openai::OpenAI::new(api_key, endpoint, timeout_secs)))
        }
        TranslationProvider::Anthropic => {
            Ok(Arc::new(anthropic::Anthropic::new(api_key, endpoint, timeout_secs)))
        }
    }
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
