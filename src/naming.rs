//! Naming convention predicates
//!
//! Total functions over strings; they never fail, they only answer.

use regex::Regex;
use std::sync::LazyLock;

static LOWER_SNAKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());

static UPPER_SNAKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

/// Hook name body after the prefix: `<concept>[__<qualifier>]`
static HOOK_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*(__[a-z][a-z0-9_]*)?$").unwrap());

static FRAME_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*\.[a-z][a-z0-9_]*$").unwrap());

/// MAJOR.MINOR.PATCH only, no pre-release or build suffix
static SEMVER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").unwrap());

/// `customer`, `order_line`, `abc_123`
pub fn lower_snake(s: &str) -> bool {
    LOWER_SNAKE.is_match(s)
}

/// `CRM`, `SAP_FIN`, `EU_WEST`
pub fn upper_snake(s: &str) -> bool {
    UPPER_SNAKE.is_match(s)
}

/// `<prefix><concept>[__<qualifier>]` for any prefix in `prefixes`
pub fn hook_name(s: &str, prefixes: &[&str]) -> bool {
    prefixes
        .iter()
        .filter_map(|prefix| s.strip_prefix(*prefix))
        .any(|body| HOOK_BODY.is_match(body))
}

/// `<schema>.<table>`, both halves lower snake
pub fn frame_name(s: &str) -> bool {
    FRAME_NAME.is_match(s)
}

pub fn semver(s: &str) -> bool {
    SEMVER.is_match(s)
}

/// Canonical hook name for a concept and optional qualifier
pub fn suggest_hook_name(prefix: &str, concept: &str, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(q) if !q.is_empty() => format!("{prefix}{}__{}", concept.to_lowercase(), q.to_lowercase()),
        _ => format!("{prefix}{}", concept.to_lowercase()),
    }
}
