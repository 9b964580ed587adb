/*!
 * Structural validation of translated subtitle blocks.
 *
 * A translated block must keep the original's line count, HTML-style markup
 * tags, and bracketed speaker labels, and must not be empty. Violations are
 * data, never errors: the retry machinery consumes them to build corrective
 * prompts, and the final report surfaces whatever remains.
 */

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::SubtitleBlock;

// @const: HTML-style markup tag, e.g. <i>, </b>, <font color="red">
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").unwrap());

// @const: Bracketed speaker/sound label, e.g. [MAN], [door slams]
static LABEL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]+\]").unwrap());

/// The closed set of structural checks a candidate can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Candidate has a different number of lines than the original
    LineCountMismatch,
    /// Candidate text is empty after trimming
    EmptyOutput,
    /// Markup tags were lost, added, or changed in multiplicity
    MissingMarkup,
    /// Bracketed labels were lost, added, or changed in multiplicity
    MissingLabel,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::LineCountMismatch => "line_count_mismatch",
            Self::EmptyOutput => "empty_output",
            Self::MissingMarkup => "missing_markup",
            Self::MissingLabel => "missing_label",
        };
        write!(f, "{}", name)
    }
}

/// One structural mismatch between an original block and its candidate.
#[derive(Debug, Clone)]
pub struct Violation {
    /// Sequence number of the offending block
    pub seq_num: usize,
    /// Which check failed
    pub kind: ViolationKind,
    /// Human-readable snapshot of what the original contained
    pub expected: String,
    /// Human-readable snapshot of what the candidate contained
    pub actual: String,
}

/// Run all structural checks of a candidate against its original.
///
/// Every check is evaluated independently; nothing short-circuits, because
/// retry prompts need the complete violation set. An empty result means the
/// candidate is structurally valid.
pub fn validate_block(original: &SubtitleBlock, candidate: &SubtitleBlock) -> Vec<Violation> {
    let mut violations = Vec::new();

    if original.lines.len() != candidate.lines.len() {
        violations.push(Violation {
            seq_num: original.seq_num,
            kind: ViolationKind::LineCountMismatch,
            expected: original.lines.len().to_string(),
            actual: candidate.lines.len().to_string(),
        });
    }

    if candidate.lines.join(" ").trim().is_empty() {
        violations.push(Violation {
            seq_num: original.seq_num,
            kind: ViolationKind::EmptyOutput,
            expected: "non-empty text".to_string(),
            actual: "(empty)".to_string(),
        });
    }

    let original_raw = original.raw_text();
    let candidate_raw = candidate.raw_text();

    if let Some((expected, actual)) = token_mismatch(&TAG_REGEX, &original_raw, &candidate_raw) {
        violations.push(Violation {
            seq_num: original.seq_num,
            kind: ViolationKind::MissingMarkup,
            expected,
            actual,
        });
    }

    if let Some((expected, actual)) = token_mismatch(&LABEL_REGEX, &original_raw, &candidate_raw) {
        violations.push(Violation {
            seq_num: original.seq_num,
            kind: ViolationKind::MissingLabel,
            expected,
            actual,
        });
    }

    violations
}

/// Compare the token multisets matched by `pattern` on each side.
///
/// Order-independent (both sides sorted) but multiplicity-sensitive: a tag
/// occurring twice in the original must occur twice in the candidate. Returns
/// the rendered token lists when they differ.
fn token_mismatch(pattern: &Regex, original: &str, candidate: &str) -> Option<(String, String)> {
    let mut original_tokens: Vec<&str> = pattern.find_iter(original).map(|m| m.as_str()).collect();
    let mut candidate_tokens: Vec<&str> = pattern.find_iter(candidate).map(|m| m.as_str()).collect();

    original_tokens.sort_unstable();
    candidate_tokens.sort_unstable();

    if original_tokens == candidate_tokens {
        return None;
    }

    Some((render_tokens(&original_tokens), render_tokens(&candidate_tokens)))
}

fn render_tokens(tokens: &[&str]) -> String {
    if tokens.is_empty() {
        "(none)".to_string()
    } else {
        tokens.join(", ")
    }
}
