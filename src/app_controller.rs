/*!
 * Application controller wiring parsing, detection, translation and output.
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use log::{info, warn};

use crate::app_config::Config;
use crate::language_utils;
use crate::progress::TranslationProgress;
use crate::providers::{GenerationOptions, Provider, create_provider};
use crate::subtitle_processor::SubtitleCollection;
use crate::translation::processor::BlockOutcome;
use crate::translation::scheduler::{TranslationOptions, translate_blocks};
use crate::translation::validator::validate_block;
use crate::translation::TranslationReport;

/// Main application controller
pub struct Controller {
    /// Application configuration
    config: Config,
}

impl Controller {
    /// Create a new controller with the given configuration
    pub fn new(config: Config) -> Self {
        Controller { config }
    }

    /// Translate an SRT file and write the result.
    pub async fn run_translate(
        &self,
        input: &Path,
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<()> {
        let collection = SubtitleCollection::parse_srt_file(input)?;
        info!(
            "Parsed {} blocks from {} ({}{})",
            collection.blocks.len(),
            input.display(),
            collection.line_ending,
            if collection.has_bom { ", BOM" } else { "" }
        );

        let output_path = match output {
            Some(path) => path,
            None => default_output_path(input, &self.config.target_language),
        };
        if output_path.exists() && !force_overwrite {
            return Err(anyhow!(
                "Output file already exists: {} (use --force-overwrite to replace it)",
                output_path.display()
            ));
        }

        let provider = create_provider(&self.config.translation)?;
        let options = self.translation_options(&collection)?;
        info!(
            "Provider: {} ({}) | {} -> {} | workers: {} | batch: {} | context: {}",
            provider.name(),
            options.generation.model,
            options.source_language,
            options.target_language,
            options.workers,
            options.batch_size,
            options.context_window
        );

        provider
            .test_connection(&options.generation)
            .await
            .context("Provider connection test failed")?;

        let progress = TranslationProgress::new(collection.blocks.len() as u64);
        let progress_handle = progress.clone();
        let outcomes = translate_blocks(
            &collection.blocks,
            provider,
            &options,
            move |completed, _total| progress_handle.update(completed as u64),
        )
        .await?;
        progress.finish();

        let report = TranslationReport::from_outcomes(&outcomes);
        info!("Passed: {}/{}", report.passed, report.total);
        if report.failed > 0 {
            let failed_blocks: Vec<String> = outcomes
                .iter()
                .filter(|o| !o.valid)
                .map(|o| o.original.seq_num.to_string())
                .collect();
            warn!(
                "{} blocks failed structural validation: {}",
                report.failed,
                failed_blocks.join(", ")
            );
        }
        if report.untransformed > 0 {
            warn!(
                "{} blocks were never covered by a provider response and kept their original text",
                report.untransformed
            );
        }

        let translated = SubtitleCollection {
            source_file: output_path.clone(),
            blocks: outcomes.into_iter().map(|o| o.candidate).collect(),
            line_ending: collection.line_ending,
            has_bom: collection.has_bom,
        };
        translated.write_to_srt(&output_path)?;
        info!("Written: {}", output_path.display());

        Ok(())
    }

    /// Translate an already-parsed collection with an explicit provider.
    ///
    /// Split out from `run_translate` so tests can drive the full pipeline
    /// with a mock provider and no filesystem or progress bar.
    pub async fn translate_collection(
        &self,
        collection: &SubtitleCollection,
        provider: Arc<dyn Provider>,
        progress: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Result<Vec<BlockOutcome>> {
        let options = self.translation_options(collection)?;
        translate_blocks(&collection.blocks, provider, &options, progress).await
    }

    /// Validate a translated SRT against its original, block by block.
    pub fn run_validate(&self, original: &Path, translated: &Path) -> Result<()> {
        let original_collection = SubtitleCollection::parse_srt_file(original)?;
        let translated_collection = SubtitleCollection::parse_srt_file(translated)?;

        let paired = original_collection
            .blocks
            .len()
            .min(translated_collection.blocks.len());
        if original_collection.blocks.len() != translated_collection.blocks.len() {
            warn!(
                "Block count differs: {} original vs {} translated; validating the first {}",
                original_collection.blocks.len(),
                translated_collection.blocks.len(),
                paired
            );
        }

        let mut passed = 0;
        let mut failed = 0;
        for (orig, trans) in original_collection
            .blocks
            .iter()
            .zip(translated_collection.blocks.iter())
        {
            let violations = validate_block(orig, trans);
            if violations.is_empty() {
                passed += 1;
            } else {
                failed += 1;
                for violation in &violations {
                    warn!(
                        "Block {}: {} (expected: {}, got: {})",
                        violation.seq_num, violation.kind, violation.expected, violation.actual
                    );
                }
            }
        }

        info!("Passed: {} | Failed: {} | Total: {}", passed, failed, paired);
        Ok(())
    }

    /// Report the detected language of an SRT file.
    pub fn run_detect(&self, input: &Path) -> Result<()> {
        let collection = SubtitleCollection::parse_srt_file(input)?;

        match language_utils::detect_from_blocks(&collection.blocks, 10) {
            Some(code) => {
                let name = language_utils::get_language_name(code)?;
                info!(
                    "{}: {} blocks, language: {} ({})",
                    input.display(),
                    collection.blocks.len(),
                    name,
                    code
                );
            }
            None => {
                warn!(
                    "{}: {} blocks, language could not be detected",
                    input.display(),
                    collection.blocks.len()
                );
            }
        }

        Ok(())
    }

    /// Resolve the scheduler options for a collection, detecting the source
    /// language when the configuration leaves it unset.
    fn translation_options(&self, collection: &SubtitleCollection) -> Result<TranslationOptions> {
        let source_code = match &self.config.source_language {
            Some(code) => code.clone(),
            None => {
                let detected = language_utils::detect_from_blocks(&collection.blocks, 10)
                    .ok_or_else(|| {
                        anyhow!(
                            "Could not detect the source language; pass --source-language explicitly"
                        )
                    })?;
                info!("Detected source language: {}", detected);
                detected.to_string()
            }
        };

        let batch = &self.config.translation.batch;
        Ok(TranslationOptions {
            batch_size: batch.batch_size,
            context_window: batch.context_window,
            workers: batch.workers,
            max_retries: batch.max_retries,
            source_language: language_utils::get_language_name(&source_code)?,
            target_language: language_utils::get_language_name(&self.config.target_language)?,
            generation: GenerationOptions {
                model: self.config.translation.get_model(),
                temperature: self.config.translation.common.temperature,
                max_tokens: self.config.translation.common.max_output_tokens,
            },
        })
    }
}

/// Default output path: `movie.srt` -> `movie.sq.srt` for target code `sq`.
fn default_output_path(input: &Path, target_language: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "translated".to_string());
    input.with_file_name(format!("{}.{}.srt", stem, target_language))
}
