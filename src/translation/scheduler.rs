/*!
 * Concurrent scheduling and merging of batch translations.
 *
 * A fixed pool of workers pulls batches from a single shared queue
 * (first-available, not a fixed partition, so unevenly slow batches
 * load-balance), accumulates outcomes in per-worker buffers, and the merged
 * result is re-sorted into source order because batches complete in
 * wall-clock-arbitrary order.
 */

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use log::{debug, info};

use crate::errors::TranslationError;
use crate::providers::{GenerationOptions, Provider};
use crate::subtitle_processor::SubtitleBlock;
use crate::translation::batch::create_batches;
use crate::translation::processor::{BatchProcessor, BlockOutcome};

/// Settings for one translation run
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Blocks per batch
    pub batch_size: usize,
    /// Preceding blocks carried as context per batch
    pub context_window: usize,
    /// Concurrent workers
    pub workers: usize,
    /// Retry budget per failing block
    pub max_retries: u32,
    /// Source language name presented to the model
    pub source_language: String,
    /// Target language name presented to the model
    pub target_language: String,
    /// Generation parameters forwarded to the provider
    pub generation: GenerationOptions,
}

/// Translate all blocks through a pool of concurrent workers.
///
/// Returns one outcome per input block, sorted by `seq_num` regardless of
/// completion order. `progress` fires with (completed blocks, total blocks)
/// after each batch finishes. A provider failure on any batch's initial call
/// aborts the run; structural failures never do.
pub async fn translate_blocks(
    blocks: &[SubtitleBlock],
    provider: Arc<dyn Provider>,
    options: &TranslationOptions,
    progress: impl Fn(usize, usize) + Clone + Send + 'static,
) -> Result<Vec<BlockOutcome>> {
    if options.workers == 0 {
        return Err(
            TranslationError::InvalidSettings("worker count must be greater than zero".to_string())
                .into(),
        );
    }

    let batches = create_batches(blocks, options.batch_size, options.context_window)?;
    if batches.is_empty() {
        return Ok(Vec::new());
    }

    let total_blocks = blocks.len();
    let worker_count = options.workers.min(batches.len());
    info!(
        "Translating {} blocks in {} batches with {} workers",
        total_blocks,
        batches.len(),
        worker_count
    );

    let processor = Arc::new(BatchProcessor::new(
        provider,
        options.generation.clone(),
        options.source_language.clone(),
        options.target_language.clone(),
        options.max_retries,
    ));

    // The queue is the only mutable state shared between workers; the pop is
    // atomic under the lock, so no two workers can claim the same batch.
    let queue = Arc::new(StdMutex::new(VecDeque::from(batches)));
    let completed = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        let queue = Arc::clone(&queue);
        let completed = Arc::clone(&completed);
        let processor = Arc::clone(&processor);
        let progress = progress.clone();

        handles.push(tokio::spawn(async move {
            let mut outcomes: Vec<BlockOutcome> = Vec::new();

            loop {
                // Take the lock only for the pop; it must not be held across
                // the await below.
                let batch = queue.lock().unwrap().pop_front();
                let Some(batch) = batch else { break };

                debug!("Worker {} picked up batch {}", worker_id, batch.index);
                let batch_len = batch.blocks.len();
                let mut batch_outcomes = processor.process(&batch).await?;
                outcomes.append(&mut batch_outcomes);

                let done = completed.fetch_add(batch_len, Ordering::SeqCst) + batch_len;
                progress(done, total_blocks);
            }

            Ok::<Vec<BlockOutcome>, anyhow::Error>(outcomes)
        }));
    }

    let worker_results = futures::future::try_join_all(handles).await?;

    let mut all_outcomes = Vec::with_capacity(total_blocks);
    for result in worker_results {
        all_outcomes.extend(result?);
    }

    // Batches complete in arbitrary order under concurrency; the caller
    // contract is source order.
    all_outcomes.sort_by_key(|outcome| outcome.original.seq_num);

    Ok(all_outcomes)
}
