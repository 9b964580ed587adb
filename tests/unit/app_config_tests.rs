/*!
 * Tests for configuration loading, defaults and validation
 */

use anyhow::Result;

use albsub::app_config::{Config, TranslationProvider};

#[test]
fn test_default_config_shouldUseDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, None);
    assert_eq!(config.target_language, "sq");
    assert_eq!(config.translation.provider, TranslationProvider::Anthropic);
    assert_eq!(config.translation.batch.batch_size, 25);
    assert_eq!(config.translation.batch.context_window, 3);
    assert_eq!(config.translation.batch.workers, 2);
    assert_eq!(config.translation.batch.max_retries, 2);
    assert_eq!(config.translation.common.max_output_tokens, 4096);
    assert_eq!(config.translation.available_providers.len(), 3);
}

#[test]
fn test_config_fromEmptyJson_shouldFillDefaults() -> Result<()> {
    let config: Config = serde_json::from_str("{}")?;

    assert_eq!(config.target_language, "sq");
    assert_eq!(config.translation.batch.batch_size, 25);

    Ok(())
}

#[test]
fn test_config_fromJsonWithOverrides_shouldApplyThem() -> Result<()> {
    let json = r#"{
        "source_language": "it",
        "target_language": "en",
        "translation": {
            "provider": "ollama",
            "batch": { "batch_size": 10, "workers": 4 }
        }
    }"#;

    let config: Config = serde_json::from_str(json)?;

    assert_eq!(config.source_language.as_deref(), Some("it"));
    assert_eq!(config.target_language, "en");
    assert_eq!(config.translation.provider, TranslationProvider::Ollama);
    assert_eq!(config.translation.batch.batch_size, 10);
    assert_eq!(config.translation.batch.workers, 4);
    // Untouched fields keep their defaults
    assert_eq!(config.translation.batch.context_window, 3);

    Ok(())
}

#[test]
fn test_config_roundTrip_shouldSerializeAndDeserialize() -> Result<()> {
    let config = Config::default();
    let json = serde_json::to_string_pretty(&config)?;
    let reparsed: Config = serde_json::from_str(&json)?;

    assert_eq!(reparsed.target_language, config.target_language);
    assert_eq!(reparsed.translation.provider, config.translation.provider);
    assert_eq!(
        reparsed.translation.batch.batch_size,
        config.translation.batch.batch_size
    );

    Ok(())
}

#[test]
fn test_validate_withOllamaProvider_shouldNotRequireApiKey() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;

    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withZeroWorkers_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.batch.workers = 0;

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroBatchSize_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.translation.batch.batch_size = 0;

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withInvalidLanguageCode_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    config.target_language = "zz".to_string();

    assert!(config.validate().is_err());
}

#[test]
fn test_get_model_withEmptyProviderModel_shouldFallBackToDefault() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    for provider in &mut config.translation.available_providers {
        provider.model = String::new();
    }

    assert_eq!(config.translation.get_model(), "llama3");
}

#[test]
fn test_get_endpoint_withConfiguredEndpoint_shouldPreferIt() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Ollama;
    for provider in &mut config.translation.available_providers {
        if provider.provider_type == "ollama" {
            provider.endpoint = "http://box:11434".to_string();
        }
    }

    assert_eq!(config.translation.get_endpoint(), "http://box:11434");
}

#[test]
fn test_provider_fromStr_shouldParseKnownNames() {
    assert_eq!(
        "anthropic".parse::<TranslationProvider>().unwrap(),
        TranslationProvider::Anthropic
    );
    assert_eq!(
        "OpenAI".parse::<TranslationProvider>().unwrap(),
        TranslationProvider::OpenAI
    );
    assert!("deepl".parse::<TranslationProvider>().is_err());
}
