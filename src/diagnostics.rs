//! Diagnostics
//!
//! Value types produced by the rule engine, plus the aggregation of a
//! diagnostic list into a single [`Outcome`]. Severity-to-outcome mapping
//! lives only here.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Blocks acceptance
    Error,
    /// Advisory only
    Warn,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Diagnostic
// =============================================================================

/// A single reported violation or advisory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable identifier, `<ENTITY>-[W]<NNN>`
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    /// Location in the manifest, e.g. `frames[2].hooks[0].name`
    pub path: String,
    /// Actionable suggestion
    pub fix: String,
}

impl Diagnostic {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        path: impl Into<String>,
        fix: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity,
            message: message.into(),
            path: path.into(),
            fix: fix.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warn
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.rule_id, self.message)?;
        write!(f, "\n  at: {}", self.path)?;
        if !self.fix.is_empty() {
            write!(f, "\n  fix: {}", self.fix)?;
        }
        Ok(())
    }
}

// =============================================================================
// Path ordering
// =============================================================================

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PathSegment<'a> {
    Index(usize),
    Key(&'a str),
}

fn path_segments(path: &str) -> Vec<PathSegment<'_>> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        let mut rest = part;
        if let Some(open) = rest.find('[') {
            segments.push(PathSegment::Key(&rest[..open]));
            rest = &rest[open..];
            while let Some(stripped) = rest.strip_prefix('[') {
                let Some(close) = stripped.find(']') else {
                    segments.push(PathSegment::Key(rest));
                    break;
                };
                match stripped[..close].parse::<usize>() {
                    Ok(index) => segments.push(PathSegment::Index(index)),
                    Err(_) => segments.push(PathSegment::Key(&stripped[..close])),
                }
                rest = &stripped[close + 1..];
            }
        } else {
            segments.push(PathSegment::Key(rest));
        }
    }
    segments
}

/// Compare two diagnostic paths structurally: keys compare as text, list
/// indices compare numerically, so `frames[2]` sorts before `frames[10]`.
pub fn compare_paths(a: &str, b: &str) -> Ordering {
    path_segments(a).cmp(&path_segments(b))
}

// =============================================================================
// Outcome
// =============================================================================

/// Acceptance decision derived from a diagnostic list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// No diagnostics at all
    Pass,
    /// Only warnings
    PassWithWarnings,
    /// At least one error
    Fail,
}

impl Outcome {
    /// Classify a diagnostic list
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        if diagnostics.iter().any(Diagnostic::is_error) {
            Self::Fail
        } else if diagnostics.is_empty() {
            Self::Pass
        } else {
            Self::PassWithWarnings
        }
    }

    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Fail)
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Pass | Self::PassWithWarnings => 0,
            Self::Fail => 1,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::PassWithWarnings => write!(f, "pass with warnings"),
            Self::Fail => write!(f, "fail"),
        }
    }
}
