/*!
 * End-to-end tests for the translation workflow: parse an SRT file, run it
 * through the worker pool with a mock provider, and write the result back.
 */

use std::sync::Arc;

use anyhow::Result;

use albsub::app_config::Config;
use albsub::app_controller::Controller;
use albsub::providers::mock::MockProvider;
use albsub::subtitle_processor::SubtitleCollection;
use albsub::translation::TranslationReport;

use crate::common;

fn test_config() -> Config {
    let mut config = Config::default();
    config.source_language = Some("en".to_string());
    config.target_language = "sq".to_string();
    config.translation.batch.batch_size = 2;
    config.translation.batch.workers = 2;
    config
}

#[tokio::test]
async fn test_workflow_withEchoProvider_shouldPreserveStructureAndOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let collection = SubtitleCollection::parse_srt_file(&input_path)?;

    let controller = Controller::new(test_config());
    let outcomes = controller
        .translate_collection(&collection, Arc::new(MockProvider::echo()), |_, _| {})
        .await?;

    assert_eq!(outcomes.len(), collection.blocks.len());
    for (outcome, block) in outcomes.iter().zip(collection.blocks.iter()) {
        assert_eq!(outcome.original.seq_num, block.seq_num);
        assert_eq!(outcome.candidate.lines, block.lines);
        assert!(outcome.valid);
    }

    let report = TranslationReport::from_outcomes(&outcomes);
    assert_eq!(report.total, collection.blocks.len());
    assert_eq!(report.passed, report.total);
    assert_eq!(report.failed, 0);
    assert!(report.violations.is_empty());

    // Write the outcomes back out and make sure the file still parses
    let output_path = temp_dir.path().join("movie.sq.srt");
    let translated = SubtitleCollection {
        source_file: output_path.clone(),
        blocks: outcomes.into_iter().map(|o| o.candidate).collect(),
        line_ending: collection.line_ending,
        has_bom: collection.has_bom,
    };
    translated.write_to_srt(&output_path)?;

    let reparsed = SubtitleCollection::parse_srt_file(&output_path)?;
    assert_eq!(reparsed.blocks.len(), collection.blocks.len());
    assert_eq!(
        reparsed.blocks[2].raw_text(),
        "<i>With markup that must survive.</i>"
    );
    assert_eq!(reparsed.blocks[3].raw_text(), "[SARAH] And a speaker label.");

    Ok(())
}

#[tokio::test]
async fn test_workflow_withDetectedSourceLanguage_shouldTranslate() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:03,000\nWhat are you doing with the map?\n\n2\n00:00:04,000 --> 00:00:06,000\nI thought that you have the keys.\n";
    let collection = SubtitleCollection::parse_srt_string(content)?;

    let mut config = test_config();
    config.source_language = None;

    let controller = Controller::new(config);
    let outcomes = controller
        .translate_collection(&collection, Arc::new(MockProvider::echo()), |_, _| {})
        .await?;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.valid));

    Ok(())
}

#[test]
fn test_run_validate_withIdenticalFiles_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let original = common::create_test_subtitle(temp_dir.path(), "original.srt")?;
    let translated = common::create_test_subtitle(temp_dir.path(), "translated.srt")?;

    let controller = Controller::new(test_config());
    controller.run_validate(&original, &translated)?;

    Ok(())
}

#[test]
fn test_run_detect_withEnglishFile_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_path = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let controller = Controller::new(test_config());
    controller.run_detect(&input_path)?;

    Ok(())
}
