//! Trim heuristics for raw provider completions.
//!
//! Completion models keep generating past the requested method body: sibling
//! methods, re-quoted docstrings, prose. These helpers cut the raw text down
//! to the part worth keeping.

use std::sync::LazyLock;

use regex::Regex;

/// An over-indented continuation line: a newline, four spaces, then anything
/// that is not a space.
static OVERINDENTED_CONTINUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n {4}[^ ]").expect("pattern is valid"));

/// Cut the completion at the first over-indented continuation line.
///
/// An empty prefix (the completion starts with such a line) falls back to
/// the whole completion.
pub fn trim_overindented_continuation(completion: &str) -> &str {
    match OVERINDENTED_CONTINUATION.find(completion) {
        Some(m) if m.start() > 0 => &completion[..m.start()],
        _ => completion,
    }
}

/// Remove the opening and closing lines of a fenced markdown block.
///
/// Leaves the text alone when the first line is not a fence marker.
pub fn strip_code_fence(content: &str) -> String {
    let mut lines: Vec<&str> = content.split('\n').collect();
    if lines.first().is_some_and(|line| line.starts_with("```")) {
        lines.remove(0);
        lines.pop();
    }
    lines.join("\n")
}

/// Keep only the text after the last `"""`, dropping re-quoted docstring
/// framing.
pub fn strip_docstring_framing(content: &str) -> &str {
    match content.rfind("\"\"\"") {
        Some(idx) => &content[idx + 3..],
        None => content,
    }
}

/// Truncate at the first blank line.
pub fn truncate_at_blank_line(content: &str) -> &str {
    content.split("\n\n").next().unwrap_or(content)
}
