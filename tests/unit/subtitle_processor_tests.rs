/*!
 * Tests for SRT parsing, formatting and file round trips
 */

use anyhow::Result;

use albsub::errors::SubtitleError;
use albsub::subtitle_processor::{LineEnding, SubtitleBlock, SubtitleCollection};

use crate::common;

#[test]
fn test_parse_srt_file_withSampleFile_shouldParseAllBlocks() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file_path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;

    let collection = SubtitleCollection::parse_srt_file(&file_path)?;

    assert_eq!(collection.blocks.len(), 4);
    assert_eq!(collection.blocks[0].seq_num, 1);
    assert_eq!(collection.blocks[0].start_time_ms, 1000);
    assert_eq!(collection.blocks[0].end_time_ms, 4000);
    assert_eq!(collection.blocks[1].lines.len(), 2);
    assert_eq!(collection.blocks[2].raw_text(), "<i>With markup that must survive.</i>");
    assert_eq!(collection.line_ending, LineEnding::Lf);
    assert!(!collection.has_bom);

    Ok(())
}

#[test]
fn test_parse_srt_string_withCrlfAndBom_shouldPreserveConventionsOnWrite() -> Result<()> {
    let content = "\u{FEFF}1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nWorld\r\n";

    let collection = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(collection.blocks.len(), 2);
    assert_eq!(collection.line_ending, LineEnding::Crlf);
    assert!(collection.has_bom);
    assert_eq!(collection.to_srt_string(), content);

    Ok(())
}

#[test]
fn test_parse_srt_string_withDotMillisecondSeparator_shouldParse() -> Result<()> {
    let content = "1\n00:00:01.500 --> 00:00:03.250\nHello\n";

    let collection = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(collection.blocks[0].start_time_ms, 1500);
    assert_eq!(collection.blocks[0].end_time_ms, 3250);

    Ok(())
}

#[test]
fn test_parse_srt_string_withMalformedBlock_shouldSkipAndKeepOthers() -> Result<()> {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nFirst\n\nthis block has no timestamp\nat all\n\n3\n00:00:05,000 --> 00:00:06,000\nThird\n";

    let collection = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(collection.blocks.len(), 2);
    assert_eq!(collection.blocks[0].seq_num, 1);
    assert_eq!(collection.blocks[1].seq_num, 3);

    Ok(())
}

#[test]
fn test_parse_srt_string_withMissingSequenceNumber_shouldAssignPositional() -> Result<()> {
    let content = "00:00:01,000 --> 00:00:02,000\nFirst\n\n00:00:03,000 --> 00:00:04,000\nSecond\n";

    let collection = SubtitleCollection::parse_srt_string(content)?;

    assert_eq!(collection.blocks.len(), 2);
    assert_eq!(collection.blocks[0].seq_num, 1);
    assert_eq!(collection.blocks[1].seq_num, 2);

    Ok(())
}

#[test]
fn test_parse_srt_string_withNoValidBlocks_shouldFailWithNoBlocks() {
    let err = SubtitleCollection::parse_srt_string("not a subtitle file").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SubtitleError>(),
        Some(SubtitleError::NoBlocks)
    ));
    assert!(SubtitleCollection::parse_srt_string("").is_err());
}

#[test]
fn test_write_to_srt_withParsedFile_shouldRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input_path = common::create_test_subtitle(temp_dir.path(), "in.srt")?;
    let output_path = temp_dir.path().join("out.srt");

    let collection = SubtitleCollection::parse_srt_file(&input_path)?;
    collection.write_to_srt(&output_path)?;

    let reparsed = SubtitleCollection::parse_srt_file(&output_path)?;
    assert_eq!(reparsed.blocks.len(), collection.blocks.len());
    for (a, b) in collection.blocks.iter().zip(reparsed.blocks.iter()) {
        assert_eq!(a.seq_num, b.seq_num);
        assert_eq!(a.start_time_ms, b.start_time_ms);
        assert_eq!(a.end_time_ms, b.end_time_ms);
        assert_eq!(a.lines, b.lines);
    }

    Ok(())
}

#[test]
fn test_format_timestamp_withVariousValues_shouldUseSrtFormat() {
    assert_eq!(SubtitleBlock::format_timestamp(0), "00:00:00,000");
    assert_eq!(SubtitleBlock::format_timestamp(1500), "00:00:01,500");
    assert_eq!(SubtitleBlock::format_timestamp(3_661_042), "01:01:01,042");
}

#[test]
fn test_parse_timestamp_withInvalidComponents_shouldFailWithInvalidTimestamp() {
    for bad in ["00:61:00,000", "garbage"] {
        let err = SubtitleBlock::parse_timestamp(bad).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SubtitleError>(),
            Some(SubtitleError::InvalidTimestamp(_))
        ));
    }
    assert_eq!(SubtitleBlock::parse_timestamp("01:02:03,004").unwrap(), 3_723_004);
}
