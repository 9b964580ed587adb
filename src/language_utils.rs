use anyhow::{Result, anyhow};
use isolang::Language;

use crate::subtitle_processor::SubtitleBlock;

/// Language utilities for ISO language code handling and source detection
///
/// This module provides functions for validating and naming ISO 639-1
/// (2-letter) and ISO 639-2 (3-letter) language codes, plus a lightweight
/// stop-word heuristic for detecting the source language of a subtitle file.
/// Normalize a language code to ISO 639-3 (3-letter) format
pub fn normalize_to_part3(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }

        // Common ISO 639-2/B codes that differ from the /T form
        let part3 = match normalized_code.as_str() {
            "fre" => "fra",
            "ger" => "deu",
            "dut" => "nld",
            "gre" => "ell",
            "alb" => "sqi",
            "rum" => "ron",
            "mac" => "mkd",
            _ => return Err(anyhow!("Invalid language code: {}", code)),
        };
        return Ok(part3.to_string());
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part3(code1), normalize_to_part3(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part3(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

// @const: Stop words per detectable source language (ISO 639-1 code)
//
// Covers the languages this tool commonly sees as sources. Words were chosen
// to be frequent in dialogue and unambiguous across the set.
static STOP_WORDS: &[(&str, &[&str])] = &[
    ("en", &["the", "and", "you", "that", "have", "what", "this", "with", "not", "are"]),
    ("it", &["che", "non", "per", "una", "sono", "cosa", "questo", "come", "della", "gli"]),
    ("fr", &["que", "pas", "les", "vous", "est", "une", "dans", "pour", "avec", "mais"]),
    ("de", &["und", "das", "ich", "nicht", "sie", "ist", "ein", "der", "wir", "aber"]),
    ("es", &["que", "los", "por", "una", "con", "está", "pero", "para", "cómo", "este"]),
    ("pt", &["que", "não", "uma", "você", "com", "para", "isso", "mas", "como", "ele"]),
    ("sq", &["dhe", "një", "për", "është", "nuk", "por", "kjo", "nga", "çfarë", "duhet"]),
];

/// Detect the language of a text sample by stop-word frequency.
///
/// Returns the ISO 639-1 code of the best match, or None when no candidate
/// language scores any hits (too little text, or a language outside the set).
pub fn detect_language(text: &str) -> Option<&'static str> {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    let mut best: Option<(&'static str, usize)> = None;
    for (code, stop_words) in STOP_WORDS {
        let hits = words.iter().filter(|w| stop_words.contains(&w.as_str())).count();
        if hits > 0 && best.is_none_or(|(_, best_hits)| hits > best_hits) {
            best = Some((code, hits));
        }
    }

    best.map(|(code, _)| code)
}

/// Detect the source language from a sample of subtitle blocks.
pub fn detect_from_blocks(blocks: &[SubtitleBlock], sample_size: usize) -> Option<&'static str> {
    let sample: String = blocks
        .iter()
        .take(sample_size)
        .map(|b| b.lines.join(" "))
        .collect::<Vec<_>>()
        .join(". ");

    detect_language(&sample)
}
