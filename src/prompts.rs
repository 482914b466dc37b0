//! Prompts sent to the LLM.

/// System instruction attached to every request.
pub const SYSTEM_PROMPT: &str = "Отвечай одним абзацем, без тегов <think> и повторов.";

/// Instruction placed in front of the document text.
pub const SUMMARY_INSTRUCTION: &str = "Сделай краткое изложение текста:";

/// Hard cap on document characters included in a summary prompt. Longer
/// documents are summarised from their prefix only.
pub const MAX_SUMMARY_CHARS: usize = 4000;

/// Build the user message for a summary request.
///
/// Only the first [`MAX_SUMMARY_CHARS`] characters of `text` are included.
pub fn summary_prompt(text: &str) -> String {
    format!("{}\n{}", SUMMARY_INSTRUCTION, truncate_chars(text, MAX_SUMMARY_CHARS))
}

/// Return the prefix of `text` holding at most `max` characters.
///
/// Counts Unicode scalar values, not bytes.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
