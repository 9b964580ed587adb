/*!
 * Common test utilities for the albsub test suite
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use albsub::subtitle_processor::SubtitleBlock;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries
and this one has two lines.

3
00:00:10,000 --> 00:00:14,000
<i>With markup that must survive.</i>

4
00:00:15,000 --> 00:00:18,000
[SARAH] And a speaker label.
"#;
    create_test_file(dir, filename, content)
}

/// Build `count` one-line blocks with sequential numbers and timings
pub fn make_blocks(count: usize) -> Vec<SubtitleBlock> {
    (1..=count)
        .map(|i| {
            SubtitleBlock::new(
                i,
                (i as u64) * 1000,
                (i as u64) * 1000 + 900,
                vec![format!("Dialogue line number {}", i)],
            )
        })
        .collect()
}
