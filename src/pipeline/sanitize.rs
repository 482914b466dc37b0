//! Response sanitising: deterministic cleanup of raw LLM output.
//!
//! Reasoning models (DeepSeek-R1 and friends) wrap their deliberation in
//! `<think>…</think>` and like to annotate answers with parenthetical
//! self-commentary ("(as requested)", "(summary below)"). The system prompt
//! asks them not to; these rules handle the cases where they do anyway.
//!
//! ## Rule Order
//!
//! 1. Strip reasoning blocks: a closed `<think>…</think>` pair goes with
//!    its contents, then any unpaired tag is removed on its own (R1 often
//!    omits the opening tag, leaving only `</think>`)
//! 2. Strip every non-nested parenthesised span
//! 3. Trim surrounding whitespace
//!
//! Rule 2 also removes parentheses that belong to the content (a date range,
//! an abbreviation).

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all sanitising rules to a raw completion.
pub fn sanitize(raw: &str) -> String {
    let s = strip_reasoning_markers(raw);
    let s = strip_parentheticals(&s);
    s.trim().to_string()
}

// ── Rule 1: Strip reasoning markers ──────────────────────────────────────────

static RE_THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

static RE_THINK_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?think>").unwrap());

fn strip_reasoning_markers(input: &str) -> String {
    let s = RE_THINK_BLOCK.replace_all(input, "");
    RE_THINK_TAG.replace_all(&s, "").into_owned()
}

// ── Rule 2: Strip parenthesised asides ───────────────────────────────────────

static RE_PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());

fn strip_parentheticals(input: &str) -> String {
    RE_PARENTHETICAL.replace_all(input, "").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoning_block_and_parenthetical() {
        let raw = "<think>reasoning</think>Итог (ненужное) готов.";
        assert_eq!(sanitize(raw), "Итог  готов.");
    }

    #[test]
    fn test_closed_block_removed_with_contents() {
        assert_eq!(strip_reasoning_markers("<think>a\nb</think>c"), "c");
        assert_eq!(
            strip_reasoning_markers("<think>1</think>x<think>2</think>y"),
            "xy"
        );
    }

    #[test]
    fn test_unpaired_tags_removed_alone() {
        assert_eq!(strip_reasoning_markers("plan</think>answer"), "plananswer");
        assert_eq!(strip_reasoning_markers("answer<think>"), "answer");
    }

    #[test]
    fn test_multiple_parentheticals() {
        assert_eq!(strip_parentheticals("a (b) c (d) e"), "a  c  e");
    }

    #[test]
    fn test_nested_parentheses_leave_tail() {
        // Shortest non-nested run wins: "(a (b)" goes, the orphan ")" stays.
        assert_eq!(strip_parentheticals("x (a (b) c) y"), "x  c) y");
    }

    #[test]
    fn test_unclosed_parenthesis_untouched() {
        assert_eq!(sanitize("open (never closed"), "open (never closed");
    }

    #[test]
    fn test_parenthetical_spanning_lines() {
        assert_eq!(sanitize("one (two\nthree) four"), "one  four");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(sanitize("  \n Готово. \n"), "Готово.");
    }

    #[test]
    fn test_idempotent_on_clean_output() {
        for raw in [
            "<think>plan</think>\n\nКраткое изложение (черновик) текста.",
            "Plain answer.",
            "  spaced  ",
            "(only aside)",
        ] {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once, "input: {raw:?}");
        }
    }
}
