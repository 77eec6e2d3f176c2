//! Frames and their hooks

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a hook within its frame
///
/// Unrecognised role strings are preserved as [`HookRole::Other`] so the
/// rule engine can report them instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HookRole {
    /// Defines (part of) the frame grain
    Primary,
    /// References another concept
    Foreign,
    Other(String),
}

impl HookRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Primary => "primary",
            Self::Foreign => "foreign",
            Self::Other(s) => s,
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Primary)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for HookRole {
    fn from(s: String) -> Self {
        match s.as_str() {
            "primary" => Self::Primary,
            "foreign" => Self::Foreign,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for HookRole {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<HookRole> for String {
    fn from(role: HookRole) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for HookRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a frame reads its rows from
///
/// Exactly one of `relation` and `path` is expected; both fields stay
/// optional here so a violation surfaces as a diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSource {
    /// Relational source, e.g. `psa.customer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
    /// File source, e.g. a QVD path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FrameSource {
    pub fn relation(relation: impl Into<String>) -> Self {
        Self {
            relation: Some(relation.into()),
            path: None,
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            relation: None,
            path: Some(path.into()),
        }
    }

    /// The relation or path, whichever is set (relation wins if both are)
    pub fn location(&self) -> Option<&str> {
        self.relation.as_deref().or(self.path.as_deref())
    }
}

/// A named wrapper around one source table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// `<schema>.<table>` in lower snake case
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<FrameSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Hooks in declaration order; order is significant for composite grain
    #[serde(default)]
    pub hooks: Vec<Hook>,
}

impl Frame {
    pub fn new(name: impl Into<String>, source: FrameSource) -> Self {
        Self {
            name: name.into(),
            source: Some(source),
            description: None,
            hooks: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Primary hooks in declaration order (the frame grain)
    pub fn primary_hooks(&self) -> impl Iterator<Item = &Hook> {
        self.hooks
            .iter()
            .filter(|h| h.role.as_ref().is_some_and(HookRole::is_primary))
    }
}

/// Identity column tying a frame to a business concept and source system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<HookRole>,
    #[serde(default)]
    pub concept: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
    /// Source system, UPPER_SNAKE
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    /// Business key expression (restricted SQL subset)
    #[serde(default)]
    pub expr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment: Option<String>,
}

impl Hook {
    pub fn new(
        name: impl Into<String>,
        role: HookRole,
        concept: impl Into<String>,
        source: impl Into<String>,
        expr: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: Some(role),
            concept: concept.into(),
            qualifier: None,
            source: source.into(),
            tenant: None,
            expr: expr.into(),
            treatment: None,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_treatment(mut self, treatment: impl Into<String>) -> Self {
        self.treatment = Some(treatment.into());
        self
    }

    pub fn is_primary(&self) -> bool {
        self.role.as_ref().is_some_and(HookRole::is_primary)
    }
}
