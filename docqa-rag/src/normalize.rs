//! Text cleanup applied to documents and queries before chunking or embedding.

use std::sync::LazyLock;

use regex::Regex;

static CONTROL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    // Tab, newline and carriage return are kept here and folded by the
    // whitespace pass instead. U+0085 (next line) is whitespace, not noise.
    Regex::new(r"[\x{00}-\x{08}\x{0B}\x{0C}\x{0E}-\x{1F}\x{7F}-\x{84}\x{86}-\x{9F}]")
        .expect("control character pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Strip control characters, collapse whitespace runs to one space, and trim.
///
/// Total and idempotent: `normalize(&normalize(x)) == normalize(x)`.
///
/// # Example
///
/// ```rust
/// use docqa_rag::normalize;
///
/// assert_eq!(normalize("  hello\u{0}\n\n  world\t"), "hello world");
/// ```
pub fn normalize(text: &str) -> String {
    let stripped = CONTROL_CHARS.replace_all(text, "");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}
