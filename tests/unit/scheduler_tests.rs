/*!
 * Tests for the concurrent worker pool and the per-block retry state machine
 */

use std::sync::{Arc, Mutex};

use anyhow::Result;

use albsub::errors::TranslationError;
use albsub::providers::GenerationOptions;
use albsub::providers::mock::{MockProvider, MockReply};
use albsub::subtitle_processor::SubtitleBlock;
use albsub::translation::{TranslationOptions, ViolationKind, translate_blocks};

use crate::common;

fn options(workers: usize, batch_size: usize, max_retries: u32) -> TranslationOptions {
    TranslationOptions {
        batch_size,
        context_window: 2,
        workers,
        max_retries,
        source_language: "English".to_string(),
        target_language: "Albanian".to_string(),
        generation: GenerationOptions {
            model: "mock-model".to_string(),
            temperature: 0.3,
            max_tokens: 4096,
        },
    }
}

fn two_line_block() -> SubtitleBlock {
    SubtitleBlock::new(1, 0, 1000, vec!["Hello".to_string(), "friend".to_string()])
}

#[tokio::test]
async fn test_translate_blocks_withManyWorkers_shouldReturnSourceOrder() -> Result<()> {
    let blocks = common::make_blocks(12);
    let provider = Arc::new(MockProvider::echo());

    let outcomes = translate_blocks(&blocks, provider, &options(4, 3, 2), |_, _| {}).await?;

    assert_eq!(outcomes.len(), 12);
    for (i, outcome) in outcomes.iter().enumerate() {
        assert_eq!(outcome.original.seq_num, i + 1);
        assert_eq!(outcome.candidate.seq_num, i + 1);
        assert_eq!(outcome.candidate.lines, blocks[i].lines);
        assert!(outcome.valid);
        assert!(outcome.transformed);
    }

    Ok(())
}

#[tokio::test]
async fn test_translate_blocks_withTwoWorkersAndSingleBlockBatches_shouldMergeInOrder()
-> Result<()> {
    let blocks = common::make_blocks(2);
    let provider = Arc::new(MockProvider::echo());

    let outcomes = translate_blocks(&blocks, provider, &options(2, 1, 2), |_, _| {}).await?;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].original.seq_num, 1);
    assert_eq!(outcomes[1].original.seq_num, 2);

    Ok(())
}

#[tokio::test]
async fn test_translate_blocks_withRepairableBlock_shouldRecoverOnRetry() -> Result<()> {
    let blocks = vec![two_line_block()];
    let provider = Arc::new(MockProvider::scripted([
        // Initial pass collapses two lines into one
        "[1]\nVetëm një rresht",
        // Retry restores the line count
        "Përshëndetje\nmiku im",
    ]));

    let outcomes =
        translate_blocks(&blocks, provider.clone(), &options(1, 10, 2), |_, _| {})
            .await?;

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].valid);
    assert!(outcomes[0].transformed);
    assert_eq!(outcomes[0].candidate.lines, vec!["Përshëndetje", "miku im"]);
    // One initial call plus exactly one retry
    assert_eq!(provider.call_count(), 2);

    Ok(())
}

#[tokio::test]
async fn test_translate_blocks_withExhaustedBudget_shouldKeepLastCandidate() -> Result<()> {
    let blocks = vec![two_line_block()];
    let provider = Arc::new(MockProvider::scripted([
        "[1]\nGabim i parë",
        "Gabim i dytë",
        "Gabim i tretë",
    ]));

    let outcomes =
        translate_blocks(&blocks, provider.clone(), &options(1, 10, 2), |_, _| {})
            .await?;

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].valid);
    assert!(outcomes[0].transformed);
    assert_eq!(outcomes[0].candidate.lines, vec!["Gabim i tretë"]);
    assert!(
        outcomes[0]
            .violations
            .iter()
            .any(|v| matches!(v.kind, ViolationKind::LineCountMismatch))
    );
    // One initial call plus the full retry budget
    assert_eq!(provider.call_count(), 3);

    Ok(())
}

#[tokio::test]
async fn test_translate_blocks_withOneBadBlockInBatch_shouldRetryOnlyThatBlock() -> Result<()> {
    let blocks = vec![
        SubtitleBlock::new(1, 0, 1000, vec!["Hello".to_string()]),
        SubtitleBlock::new(2, 1500, 2500, vec!["How are".to_string(), "you today".to_string()]),
    ];
    let provider = Arc::new(MockProvider::scripted([
        "[1]\nPërshëndetje\n---\n[2]\nGabim",
        "Si jeni\nju sot",
    ]));

    let outcomes =
        translate_blocks(&blocks, provider.clone(), &options(1, 10, 2), |_, _| {})
            .await?;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].valid);
    assert_eq!(outcomes[0].candidate.lines, vec!["Përshëndetje"]);
    assert!(outcomes[1].valid);
    assert_eq!(outcomes[1].candidate.lines, vec!["Si jeni", "ju sot"]);
    assert_eq!(provider.call_count(), 2);

    Ok(())
}

#[tokio::test]
async fn test_translate_blocks_withRetryCallError_shouldConsumeBudgetAndContinue() -> Result<()> {
    let blocks = vec![two_line_block()];
    let provider = Arc::new(MockProvider::scripted_replies(vec![
        MockReply::Text("[1]\nVetëm një rresht".to_string()),
        MockReply::Error("transient failure".to_string()),
        MockReply::Text("Përshëndetje\nmiku im".to_string()),
    ]));

    let outcomes =
        translate_blocks(&blocks, provider.clone(), &options(1, 10, 2), |_, _| {})
            .await?;

    assert!(outcomes[0].valid);
    assert_eq!(outcomes[0].candidate.lines, vec!["Përshëndetje", "miku im"]);
    assert_eq!(provider.call_count(), 3);

    Ok(())
}

#[tokio::test]
async fn test_translate_blocks_withInitialCallFailure_shouldAbortRun() {
    let blocks = common::make_blocks(4);
    let provider = Arc::new(MockProvider::failing());

    let result = translate_blocks(&blocks, provider, &options(2, 2, 2), |_, _| {}).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_translate_blocks_withEmptyResponses_shouldFallBackToOriginals() -> Result<()> {
    let blocks = common::make_blocks(3);
    let provider = Arc::new(MockProvider::empty());

    let outcomes =
        translate_blocks(&blocks, provider.clone(), &options(1, 10, 2), |_, _| {})
            .await?;

    for (outcome, block) in outcomes.iter().zip(blocks.iter()) {
        // An untouched original is structurally identical to itself, so the
        // fallback validates but is flagged as never transformed.
        assert!(outcome.valid);
        assert!(!outcome.transformed);
        assert_eq!(outcome.candidate.lines, block.lines);
    }
    assert_eq!(provider.call_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_translate_blocks_withZeroWorkers_shouldFail() {
    let blocks = common::make_blocks(2);
    let provider = Arc::new(MockProvider::echo());

    let err = translate_blocks(&blocks, provider, &options(0, 2, 2), |_, _| {})
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TranslationError>(),
        Some(TranslationError::InvalidSettings(_))
    ));
}

#[tokio::test]
async fn test_translate_blocks_withSingleWorker_shouldReportMonotonicProgress() -> Result<()> {
    let blocks = common::make_blocks(10);
    let provider = Arc::new(MockProvider::echo());

    let recorded: Arc<Mutex<Vec<(usize, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&recorded);

    translate_blocks(&blocks, provider, &options(1, 3, 2), move |done, total| {
        sink.lock().unwrap().push((done, total));
    })
    .await?;

    let recorded = recorded.lock().unwrap();
    // 10 blocks at batch size 3 makes 4 batches
    assert_eq!(recorded.len(), 4);
    assert!(recorded.windows(2).all(|w| w[0].0 < w[1].0));
    assert_eq!(recorded.last(), Some(&(10, 10)));
    assert!(recorded.iter().all(|&(_, total)| total == 10));

    Ok(())
}
