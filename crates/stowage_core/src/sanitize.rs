//! Filesystem-safe path segments from record values.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum length of a sanitized segment, in characters.
pub const MAX_SEGMENT_CHARS: usize = 40;

static ILLEGAL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s\d\-_~,;\[\]\(\)]").expect("illegal character pattern is valid")
});

static DOT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.{2,}").expect("dot run pattern is valid"));

/// Normalizes a record value into a path segment.
///
/// Characters that are reserved on Windows or Linux file systems are replaced
/// with `-`, runs of dots are dropped, and the result is capped at
/// [`MAX_SEGMENT_CHARS`] characters.
///
/// # Example
///
/// ```
/// use stowage_core::sanitize;
///
/// assert_eq!(sanitize("John Doe"), "John Doe");
/// assert_eq!(sanitize("a/b:c"), "a-b-c");
/// assert!(!sanitize("../../etc/passwd").contains(".."));
/// ```
pub fn sanitize(value: &str) -> String {
    let replaced = ILLEGAL_CHARS.replace_all(value, "-");
    let collapsed = DOT_RUNS.replace_all(&replaced, "");
    collapsed.chars().take(MAX_SEGMENT_CHARS).collect()
}
