//! Formatting cleanup for model replies.

use std::sync::LazyLock;

use regex::Regex;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A```[^\n`]*\n(.*?)\n?```\z").expect("fence pattern is valid")
});
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("blank line pattern is valid"));
static INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("space pattern is valid"));

/// Normalizes whitespace, code fences and surrounding quotes.
///
/// One pass trims, strips a single wrapping code fence (opener line with an optional
/// language tag, plus the closing marker), collapses blank-line runs to one blank line and
/// space/tab runs to one space, then strips surrounding quotes and whitespace.
///
/// Passes repeat until the text is stable. A pass never lengthens its input and only returns
/// an equal-length string when nothing changed, so the loop terminates and the function is
/// idempotent: `clean_text(&clean_text(s)) == clean_text(s)`.
pub fn clean_text(text: &str) -> String {
    let mut current = clean_pass(text);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(text: &str) -> String {
    let trimmed = text.trim();
    let unfenced = strip_fence(trimmed);
    let lines = BLANK_LINES.replace_all(unfenced, "\n\n");
    let spaced = INLINE_SPACE.replace_all(&lines, " ");
    spaced
        .trim_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace())
        .to_string()
}

fn strip_fence(text: &str) -> &str {
    FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |body| body.as_str())
}
