/*!
 * Prompt construction for subtitle translation.
 *
 * Pure string builders with no state. The format contract these prompts set
 * up (sections separated by `---`, each optionally prefixed with a `[N]`
 * label) is what the response parser in `processor` relies on.
 */

use crate::subtitle_processor::SubtitleBlock;
use crate::translation::validator::{Violation, ViolationKind};

/// System prompt establishing the translation rules and output format.
pub fn system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        r#"You are a professional subtitle translator. Translate the following subtitle blocks from {source_language} to {target_language}.

Rules:
- Keep EXACTLY the same number of lines per block. If the original block has 2 lines, your translation MUST have exactly 2 lines.
- Preserve ALL HTML tags (<i>, <b>, </i>, </b>) exactly as they appear, in the same positions.
- Preserve speaker labels in brackets [Name] exactly as they appear.
- Use natural, colloquial {target_language} — this is movie dialogue, not a textbook.
- Match the tone of the dialogue (comedy = informal, drama = more formal).
- Pay attention to grammatical gender. Infer gender from speaker names, context, and the source language grammar.
- Keep proper nouns unchanged (character names, place names).
- Each subtitle block is labeled with its number and separated by "---".
- Return ONLY the translated blocks in the exact same format. No explanations.

Output format (one block per section, separated by ---):
[NUMBER]
translated line 1
translated line 2
---"#
    )
}

/// Build the user prompt for a batch: optional untranslatable context
/// followed by the numbered blocks to translate.
pub fn build_user_prompt(blocks: &[SubtitleBlock], context: &[SubtitleBlock]) -> String {
    let mut prompt = String::new();

    if !context.is_empty() {
        prompt.push_str("Context (previous dialogue, do NOT translate — for reference only):\n");
        for block in context {
            prompt.push_str(&format!("[{}]\n{}\n\n", block.seq_num, block.raw_text()));
        }
        prompt.push_str("---\n\n");
    }

    prompt.push_str("Translate these blocks:\n\n");
    for block in blocks {
        prompt.push_str(&format!("[{}]\n{}\n---\n", block.seq_num, block.raw_text()));
    }

    prompt
}

/// Build a corrective prompt for a single block from its current violations.
pub fn build_retry_prompt(
    violations: &[Violation],
    original_lines: &[String],
    candidate_lines: &[String],
) -> String {
    let descriptions: Vec<String> = violations.iter().map(describe_violation).collect();

    format!(
        r#"Your previous translation had the following issues:

{issues}

Original text:
{original}

Your previous translation:
{candidate}

Please fix these issues and provide the corrected translation. Remember:
- EXACTLY the same number of lines per block
- Preserve ALL HTML tags
- Preserve ALL speaker labels [Name]
- Return ONLY the corrected translation blocks."#,
        issues = descriptions.join("\n"),
        original = original_lines.join("\n"),
        candidate = candidate_lines.join("\n"),
    )
}

fn describe_violation(violation: &Violation) -> String {
    match violation.kind {
        ViolationKind::LineCountMismatch => format!(
            "Block {}: Expected {} lines but got {} lines. You MUST keep exactly {} lines.",
            violation.seq_num, violation.expected, violation.actual, violation.expected
        ),
        ViolationKind::EmptyOutput => format!(
            "Block {}: Translation was empty. Provide a proper translation.",
            violation.seq_num
        ),
        ViolationKind::MissingMarkup => format!(
            "Block {}: HTML tags were lost. Original had: {}. Your translation had: {}. Preserve all HTML tags exactly.",
            violation.seq_num, violation.expected, violation.actual
        ),
        ViolationKind::MissingLabel => format!(
            "Block {}: Speaker labels were lost. Original had: {}. Your translation had: {}. Preserve all [Speaker] labels exactly.",
            violation.seq_num, violation.expected, violation.actual
        ),
    }
}
