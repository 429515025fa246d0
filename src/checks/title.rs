//! Conventional Commits title validation

use regex::Regex;
use std::sync::LazyLock;

/// Commit types accepted in a PR title
pub const CONVENTIONAL_TYPES: [&str; 12] = [
    "build", "chore", "ci", "deps", "docs", "feat", "fix", "perf", "refactor", "revert", "style",
    "test",
];

/// `<type>[(scope)][!]: <description>`
///
/// The scope may not be empty and may not contain `!`, `(` or `)`. The
/// breaking marker sits directly before the colon.
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<type>[a-z]+)(?:\((?P<scope>[^()!]+)\))?!?: \S.*$")
        .expect("title pattern is a valid regex")
});

/// Whether `title` follows the Conventional Commits format
pub fn is_conventional_title(title: &str) -> bool {
    TITLE_RE
        .captures(title)
        .and_then(|caps| caps.name("type"))
        .is_some_and(|t| CONVENTIONAL_TYPES.contains(&t.as_str()))
}
