/*!
 * Batch processing and the per-block retry state machine.
 *
 * For one batch: build a single request covering every block, parse the
 * response into positional candidates, validate each candidate, then drive a
 * bounded retry loop for whatever failed. Retries are scoped to exactly the
 * failing block so one bad block never re-costs its neighbors, and they are
 * capped to bound worst-case latency per job.
 */

use std::sync::Arc;

use anyhow::Result;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TranslationError;
use crate::providers::{GenerationOptions, Provider};
use crate::subtitle_processor::SubtitleBlock;
use crate::translation::prompts;
use crate::translation::batch::TranslationBatch;
use crate::translation::validator::{Violation, validate_block};

// @const: Section label emitted by the model, e.g. "[42]"
static SECTION_LABEL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\d+\]$").unwrap());

/// The per-block result of processing.
///
/// Mutated in place by its owning worker through the retry loop; final once
/// validation passes or the retry budget runs out.
#[derive(Debug, Clone)]
pub struct BlockOutcome {
    /// The source block, unchanged
    pub original: SubtitleBlock,

    /// The best translated candidate found so far
    pub candidate: SubtitleBlock,

    /// Whether `candidate` currently satisfies all structural checks
    pub valid: bool,

    /// Violations found on the most recent check
    pub violations: Vec<Violation>,

    /// False when the candidate is the untouched original (the provider
    /// response never covered this block)
    pub transformed: bool,
}

/// Processes one batch at a time against a provider.
pub struct BatchProcessor {
    provider: Arc<dyn Provider>,
    generation: GenerationOptions,
    source_language: String,
    target_language: String,
    max_retries: u32,
}

impl BatchProcessor {
    pub fn new(
        provider: Arc<dyn Provider>,
        generation: GenerationOptions,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        max_retries: u32,
    ) -> Self {
        Self {
            provider,
            generation,
            source_language: source_language.into(),
            target_language: target_language.into(),
            max_retries,
        }
    }

    /// Process one batch: initial pass over all blocks, then bounded retries
    /// for every block that failed validation.
    ///
    /// Always returns one outcome per block in batch order. A provider error
    /// on the initial call propagates; retry-call errors are absorbed as
    /// failed attempts.
    pub async fn process(&self, batch: &TranslationBatch) -> Result<Vec<BlockOutcome>> {
        if batch.blocks.is_empty() {
            return Ok(Vec::new());
        }

        let system = prompts::system_prompt(&self.source_language, &self.target_language);
        let user = prompts::build_user_prompt(&batch.blocks, &batch.context);

        let response = self
            .provider
            .generate(&system, &user, &self.generation)
            .await
            .map_err(TranslationError::Provider)?;

        let mut outcomes: Vec<BlockOutcome> = parse_response(&response, &batch.blocks)
            .into_iter()
            .zip(batch.blocks.iter())
            .map(|((candidate, transformed), original)| {
                let violations = validate_block(original, &candidate);
                BlockOutcome {
                    original: original.clone(),
                    valid: violations.is_empty(),
                    candidate,
                    violations,
                    transformed,
                }
            })
            .collect();

        for outcome in outcomes.iter_mut().filter(|o| !o.valid) {
            self.retry_block(outcome, &system).await;
        }

        Ok(outcomes)
    }

    /// Drive the bounded retry loop for a single failing block.
    ///
    /// Each attempt sends a corrective single-block prompt built from the
    /// current violations. The budget is consumed on every attempt, whether
    /// the call errors, improves nothing, or succeeds; the loop ends when the
    /// block validates or the budget reaches zero. A block that never
    /// validates stays in the outcome set with its last-known violations.
    async fn retry_block(&self, outcome: &mut BlockOutcome, system: &str) {
        let mut budget = self.max_retries;

        while !outcome.valid && budget > 0 {
            let prompt = prompts::build_retry_prompt(
                &outcome.violations,
                &outcome.original.lines,
                &outcome.candidate.lines,
            );

            match self.provider.generate(system, &prompt, &self.generation).await {
                Err(e) => {
                    debug!(
                        "Retry call for block {} failed, keeping previous candidate: {}",
                        outcome.original.seq_num, e
                    );
                }
                Ok(response) => {
                    let parsed = parse_response(&response, std::slice::from_ref(&outcome.original));
                    match parsed.into_iter().next() {
                        Some((candidate, true)) => {
                            outcome.violations = validate_block(&outcome.original, &candidate);
                            outcome.valid = outcome.violations.is_empty();
                            outcome.candidate = candidate;
                            outcome.transformed = true;
                        }
                        // No parseable content: keep the current candidate.
                        _ => {
                            debug!(
                                "Retry response for block {} had no parseable section",
                                outcome.original.seq_num
                            );
                        }
                    }
                }
            }

            budget -= 1;
        }

        if !outcome.valid {
            warn!(
                "Block {} still invalid after {} retries: {}",
                outcome.original.seq_num,
                self.max_retries,
                outcome
                    .violations
                    .iter()
                    .map(|v| v.kind.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
}

/// Split a provider response into one candidate per original block.
///
/// Sections are separated by `---` and matched to blocks positionally, never
/// by content. An optional leading `[N]` label line is stripped. A block
/// whose section is missing or empty falls back to a candidate identical to
/// its original, flagged untransformed, so every block always has a
/// candidate. No other structure is assumed of the response text.
pub fn parse_response(response: &str, originals: &[SubtitleBlock]) -> Vec<(SubtitleBlock, bool)> {
    let sections: Vec<&str> = response
        .split("---")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    originals
        .iter()
        .enumerate()
        .map(|(i, original)| match sections.get(i) {
            Some(section) => {
                let mut lines: Vec<String> = section
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(|l| l.to_string())
                    .collect();

                if lines
                    .first()
                    .is_some_and(|l| SECTION_LABEL_REGEX.is_match(l.trim()))
                {
                    lines.remove(0);
                }

                if lines.is_empty() {
                    (original.clone(), false)
                } else {
                    (original.with_lines(lines), true)
                }
            }
            None => (original.clone(), false),
        })
        .collect()
}
