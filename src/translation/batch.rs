/*!
 * Batch construction for translation requests.
 *
 * Splits an ordered block sequence into fixed-size batches, each carrying a
 * trailing window of the preceding blocks as read-only context for the model.
 */

use anyhow::Result;
use log::debug;

use crate::errors::TranslationError;
use crate::subtitle_processor::SubtitleBlock;

/// A contiguous run of blocks to translate, plus read-only context.
///
/// Immutable after creation; consumed by exactly one worker.
#[derive(Debug, Clone)]
pub struct TranslationBatch {
    /// Blocks to be translated
    pub blocks: Vec<SubtitleBlock>,

    /// Blocks immediately preceding `blocks` in the source sequence,
    /// supplied for continuity but never translated or validated
    pub context: Vec<SubtitleBlock>,

    /// Position of this batch in the overall batch sequence (zero-based)
    pub index: usize,
}

/// Split blocks into batches of at most `batch_size`, each carrying up to
/// `context_window` preceding blocks as context (none for the first batch).
///
/// Every block lands in exactly one batch's `blocks`, in source order; the
/// final batch may be shorter. Fails fast on a zero batch size.
pub fn create_batches(
    blocks: &[SubtitleBlock],
    batch_size: usize,
    context_window: usize,
) -> Result<Vec<TranslationBatch>> {
    if batch_size == 0 {
        return Err(
            TranslationError::InvalidSettings("batch size must be greater than zero".to_string())
                .into(),
        );
    }

    let mut batches = Vec::with_capacity(blocks.len().div_ceil(batch_size));

    for (index, start) in (0..blocks.len()).step_by(batch_size).enumerate() {
        let end = (start + batch_size).min(blocks.len());
        let context_start = start.saturating_sub(context_window);

        let context = if start > 0 {
            blocks[context_start..start].to_vec()
        } else {
            Vec::new()
        };

        batches.push(TranslationBatch {
            blocks: blocks[start..end].to_vec(),
            context,
            index,
        });
    }

    debug!(
        "Created {} batches from {} blocks (batch size {}, context window {})",
        batches.len(),
        blocks.len(),
        batch_size,
        context_window
    );

    Ok(batches)
}
