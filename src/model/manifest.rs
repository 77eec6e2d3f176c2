//! Manifest root, metadata and settings

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Concept, Frame};

/// Top-level keys understood by this version of the manifest format.
pub const KNOWN_TOP_LEVEL_FIELDS: &[&str] = &[
    "manifest_version",
    "schema_version",
    "metadata",
    "settings",
    "frames",
    "concepts",
];

/// Root manifest document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// User-controlled version of this manifest (semver)
    pub manifest_version: String,
    /// Version of the manifest format (semver)
    pub schema_version: String,
    pub metadata: Metadata,
    #[serde(default)]
    pub settings: Settings,
    /// Frames in declaration order. An empty list is a rule violation,
    /// not a parse failure.
    #[serde(default)]
    pub frames: Vec<Frame>,
    #[serde(default)]
    pub concepts: Vec<Concept>,
    /// Top-level keys outside [`KNOWN_TOP_LEVEL_FIELDS`], kept for
    /// forward-compatibility warnings.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Manifest {
    /// Create a manifest with no frames or concepts and default settings
    pub fn new(
        manifest_version: impl Into<String>,
        schema_version: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            manifest_version: manifest_version.into(),
            schema_version: schema_version.into(),
            metadata,
            settings: Settings::default(),
            frames: Vec::new(),
            concepts: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    /// Attach an unrecognised top-level field
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Total number of hooks across all frames
    pub fn hook_count(&self) -> usize {
        self.frames.iter().map(|f| f.hooks.len()).sum()
    }
}

/// Descriptive metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Metadata {
    /// Metadata stamped with the same creation and update time
    pub fn new(name: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            description: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Hook naming conventions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Prefix for strong hooks
    #[serde(default = "default_hook_prefix")]
    pub hook_prefix: String,
    /// Prefix for weak (reference/time) hooks
    #[serde(default = "default_weak_hook_prefix")]
    pub weak_hook_prefix: String,
    /// Separator between key set and business key. Must be a single
    /// character; anything else fails deserialization.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_hook_prefix() -> String {
    "_hk__".to_string()
}

fn default_weak_hook_prefix() -> String {
    "_wk__".to_string()
}

fn default_delimiter() -> char {
    '|'
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hook_prefix: default_hook_prefix(),
            weak_hook_prefix: default_weak_hook_prefix(),
            delimiter: default_delimiter(),
        }
    }
}

impl Settings {
    /// Both configured prefixes, strong first
    pub fn prefixes(&self) -> [&str; 2] {
        [self.hook_prefix.as_str(), self.weak_hook_prefix.as_str()]
    }

    /// Whether `hook_name` starts with the weak prefix
    pub fn is_weak_hook_name(&self, hook_name: &str) -> bool {
        !self.weak_hook_prefix.is_empty() && hook_name.starts_with(&self.weak_hook_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_defaults_when_absent() {
        let manifest: Manifest = serde_json::from_value(json!({
            "manifest_version": "1.0.0",
            "schema_version": "1.0.0",
            "metadata": {
                "name": "sales",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }
        }))
        .unwrap();

        assert_eq!(manifest.settings, Settings::default());
        assert_eq!(manifest.settings.delimiter, '|');
        assert!(manifest.frames.is_empty());
        assert!(manifest.extra.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_retained() {
        let manifest: Manifest = serde_json::from_value(json!({
            "manifest_version": "1.0.0",
            "schema_version": "1.0.0",
            "metadata": {
                "name": "sales",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            },
            "keysets": [],
            "owner": "data-team"
        }))
        .unwrap();

        let keys: Vec<_> = manifest.extra.keys().cloned().collect();
        assert_eq!(keys, vec!["keysets", "owner"]);
    }

    #[test]
    fn test_multi_char_delimiter_rejected() {
        let result: Result<Settings, _> = serde_json::from_value(json!({ "delimiter": "||" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_weak_prefix_detection() {
        let settings = Settings::default();
        assert!(settings.is_weak_hook_name("_wk__ref__genre"));
        assert!(!settings.is_weak_hook_name("_hk__customer"));
    }
}
