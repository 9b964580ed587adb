use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @module: SRT parsing, writing and block manipulation

// @const: SRT timestamp regex (accepts ',' or '.' as the millisecond separator)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})")
        .unwrap()
});

const BOM: char = '\u{FEFF}';

/// Line-ending convention of a subtitle file, preserved on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Crlf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Lf => write!(f, "LF"),
            Self::Crlf => write!(f, "CRLF"),
        }
    }
}

/// One subtitle block: a numbered, timed run of text lines.
///
/// The line vector is the unit of structural fidelity: line count and order
/// are significant, and the raw text used for tag/label checks is always
/// derived from it rather than stored separately.
#[derive(Debug, Clone)]
pub struct SubtitleBlock {
    // @field: Sequence number (stable identity, not necessarily contiguous)
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Text lines in display order
    pub lines: Vec<String>,
}

impl SubtitleBlock {
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, lines: Vec<String>) -> Self {
        SubtitleBlock {
            seq_num,
            start_time_ms,
            end_time_ms,
            lines,
        }
    }

    /// Text lines joined with newlines. Used for markup/label pattern checks.
    pub fn raw_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Replace the text lines, keeping number and timing untouched.
    pub fn with_lines(&self, lines: Vec<String>) -> Self {
        SubtitleBlock {
            seq_num: self.seq_num,
            start_time_ms: self.start_time_ms,
            end_time_ms: self.end_time_ms,
            lines,
        }
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm or HH:MM:SS.mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()).into());
        }

        let hours: u64 = parts[0].trim().parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()).into());
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// Collection of subtitle blocks with source-file metadata
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// List of subtitle blocks
    pub blocks: Vec<SubtitleBlock>,

    /// Line-ending convention detected on parse
    pub line_ending: LineEnding,

    /// Whether the source carried a UTF-8 BOM
    pub has_bom: bool,
}

impl SubtitleCollection {
    pub fn new(source_file: PathBuf, blocks: Vec<SubtitleBlock>) -> Self {
        SubtitleCollection {
            source_file,
            blocks,
            line_ending: LineEnding::default(),
            has_bom: false,
        }
    }

    /// Parse an SRT file from disk, preserving its encoding metadata.
    pub fn parse_srt_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;

        let mut collection = Self::parse_srt_string(&content)?;
        collection.source_file = path.to_path_buf();
        Ok(collection)
    }

    /// Parse SRT content into a collection.
    ///
    /// Detects and strips a UTF-8 BOM, normalizes CRLF for parsing while
    /// recording the convention for later writes, and skips malformed blocks
    /// with a warning rather than failing the whole file.
    pub fn parse_srt_string(content: &str) -> Result<Self> {
        let has_bom = content.starts_with(BOM);
        let text = if has_bom { &content[BOM.len_utf8()..] } else { content };

        let line_ending = if text.contains("\r\n") {
            LineEnding::Crlf
        } else {
            LineEnding::Lf
        };
        let normalized = text.replace("\r\n", "\n");

        let blocks = Self::parse_blocks(&normalized)?;

        Ok(SubtitleCollection {
            source_file: PathBuf::new(),
            blocks,
            line_ending,
            has_bom,
        })
    }

    /// Parse normalized (LF-only) SRT text into blocks.
    fn parse_blocks(text: &str) -> Result<Vec<SubtitleBlock>> {
        let mut blocks = Vec::new();

        for raw_block in text.split("\n\n") {
            let trimmed = raw_block.trim();
            if trimmed.is_empty() {
                continue;
            }

            let lines: Vec<&str> = trimmed.lines().collect();
            if lines.len() < 2 {
                continue;
            }

            // Locate the timestamp line within the first lines of the block;
            // some files omit the sequence number, some prepend junk.
            let ts_index = lines
                .iter()
                .take(3)
                .position(|line| TIMESTAMP_REGEX.is_match(line.trim()));

            let Some(ts_index) = ts_index else {
                warn!("Skipping block without a timestamp line: {:?}", lines.first());
                continue;
            };

            let seq_num = if ts_index > 0 {
                lines[ts_index - 1].trim().parse::<usize>().ok()
            } else {
                None
            };
            let seq_num = seq_num.unwrap_or(blocks.len() + 1);

            let (start_time_ms, end_time_ms) =
                match Self::parse_timestamp_line(lines[ts_index].trim()) {
                    Ok(times) => times,
                    Err(e) => {
                        warn!("Skipping block {}: {}", seq_num, e);
                        continue;
                    }
                };

            let text_lines: Vec<String> = lines[ts_index + 1..]
                .iter()
                .filter(|l| !l.trim().is_empty())
                .map(|l| l.to_string())
                .collect();

            if text_lines.is_empty() {
                warn!("Skipping empty subtitle block {}", seq_num);
                continue;
            }

            blocks.push(SubtitleBlock::new(seq_num, start_time_ms, end_time_ms, text_lines));
        }

        if blocks.is_empty() {
            return Err(SubtitleError::NoBlocks.into());
        }

        Ok(blocks)
    }

    /// Parse a "start --> end" timestamp line into millisecond pairs.
    fn parse_timestamp_line(line: &str) -> Result<(u64, u64)> {
        let caps = TIMESTAMP_REGEX
            .captures(line)
            .ok_or_else(|| anyhow!("Invalid timestamp line: {}", line))?;

        let start = Self::captures_to_ms(&caps, 1);
        let end = Self::captures_to_ms(&caps, 5);

        Ok((start, end))
    }

    fn captures_to_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
        let hours: u64 = caps.get(start_idx).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let minutes: u64 = caps.get(start_idx + 1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let seconds: u64 = caps.get(start_idx + 2).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let millis: u64 = caps.get(start_idx + 3).map_or(0, |m| m.as_str().parse().unwrap_or(0));

        (hours * 3600 + minutes * 60 + seconds) * 1000 + millis
    }

    /// Render the collection as SRT text using its recorded conventions.
    pub fn to_srt_string(&self) -> String {
        let eol = self.line_ending.as_str();
        let mut output = String::new();

        if self.has_bom {
            output.push(BOM);
        }

        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                output.push_str(eol);
            }
            output.push_str(&block.seq_num.to_string());
            output.push_str(eol);
            output.push_str(&block.format_start_time());
            output.push_str(" --> ");
            output.push_str(&block.format_end_time());
            output.push_str(eol);
            for line in &block.lines {
                output.push_str(line);
                output.push_str(eol);
            }
        }

        output
    }

    /// Write the collection to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        fs::write(path, self.to_srt_string())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Blocks: {}", self.blocks.len())?;
        writeln!(f, "Line ending: {}", self.line_ending)?;
        Ok(())
    }
}
