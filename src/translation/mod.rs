/*!
 * Translation pipeline for subtitle blocks.
 *
 * The pipeline is split into several submodules:
 *
 * - `batch`: Fixed-size batching with trailing context windows
 * - `validator`: Structural checks of candidates against originals
 * - `processor`: Batch requests, response parsing, and the per-block retry
 *   state machine
 * - `scheduler`: The concurrent worker pool and order-restoring merge
 * - `prompts`: System, user, and retry prompt builders
 */

use crate::translation::validator::Violation;

// Re-export main types for easier usage
pub use self::batch::{TranslationBatch, create_batches};
pub use self::processor::{BatchProcessor, BlockOutcome};
pub use self::scheduler::{TranslationOptions, translate_blocks};
pub use self::validator::{ViolationKind, validate_block};

// Submodules
pub mod batch;
pub mod processor;
pub mod prompts;
pub mod scheduler;
pub mod validator;

/// Job-health summary over a full set of outcomes.
#[derive(Debug, Clone)]
pub struct TranslationReport {
    /// Total number of blocks processed
    pub total: usize,
    /// Blocks whose candidate passed all structural checks
    pub passed: usize,
    /// Blocks still failing after the retry budget
    pub failed: usize,
    /// Blocks whose candidate is the untouched original (the provider
    /// response never covered them)
    pub untransformed: usize,
    /// Every violation still standing, in block order
    pub violations: Vec<Violation>,
}

impl TranslationReport {
    /// Summarize a completed run.
    pub fn from_outcomes(outcomes: &[BlockOutcome]) -> Self {
        let total = outcomes.len();
        let passed = outcomes.iter().filter(|o| o.valid).count();
        let untransformed = outcomes.iter().filter(|o| !o.transformed).count();
        let violations = outcomes
            .iter()
            .flat_map(|o| o.violations.iter().cloned())
            .collect();

        TranslationReport {
            total,
            passed,
            failed: total - passed,
            untransformed,
            violations,
        }
    }
}
