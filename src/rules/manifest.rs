//! Manifest-level rules

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use super::{Rule, RuleContext};
use crate::diagnostics::Diagnostic;
use crate::model::KNOWN_TOP_LEVEL_FIELDS;
use crate::naming;

pub(super) fn manifest_version(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let version = &ctx.manifest.manifest_version;
    if naming::semver(version) {
        return Vec::new();
    }
    vec![rule.emit(
        format!("Invalid manifest_version: '{version}'. Must be semantic version MAJOR.MINOR.PATCH"),
        "manifest_version",
        "Use format like '1.0.0', '0.1.0', or '2.1.3'",
    )]
}

pub(super) fn schema_version(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let version = &ctx.manifest.schema_version;
    if naming::semver(version) {
        return Vec::new();
    }
    vec![rule.emit(
        format!("Invalid schema_version: '{version}'. Must be semantic version MAJOR.MINOR.PATCH"),
        "schema_version",
        "Use format like '1.0.0'",
    )]
}

pub(super) fn metadata_name(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !ctx.manifest.metadata.name.trim().is_empty() {
        return Vec::new();
    }
    vec![rule.emit(
        "Manifest metadata.name is empty",
        "metadata.name",
        "Give the manifest a descriptive name, e.g. 'sales_domain'",
    )]
}

pub(super) fn frames_present(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    if !ctx.manifest.frames.is_empty() {
        return Vec::new();
    }
    vec![rule.emit(
        "Manifest declares no frames",
        "frames",
        "Add at least one frame with a source and a primary hook",
    )]
}

pub(super) fn too_many_frames(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    let count = ctx.manifest.frames.len();
    let limit = ctx.config.limits.max_frames;
    if count <= limit {
        return Vec::new();
    }
    vec![rule.emit(
        format!("Manifest has {count} frames (exceeds {limit}). Consider splitting into multiple manifests"),
        "frames",
        "Group related frames into separate manifests by domain",
    )]
}

pub(super) fn unknown_fields(rule: &Rule, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
    ctx.manifest
        .extra
        .keys()
        .map(|field| {
            let fix = match nearest_known_field(field) {
                Some(known) => format!("Did you mean '{known}'? Otherwise remove the field"),
                None => "Check schema version compatibility or remove unknown field".to_string(),
            };
            rule.emit(
                format!("Unknown field '{field}' in manifest root. It will be ignored"),
                field.as_str(),
                fix,
            )
        })
        .collect()
}

/// Best fuzzy match among the known top-level keys
fn nearest_known_field(field: &str) -> Option<&'static str> {
    let matcher = SkimMatcherV2::default();
    KNOWN_TOP_LEVEL_FIELDS
        .iter()
        .filter_map(|known| matcher.fuzzy_match(known, field).map(|score| (score, *known)))
        .max_by_key(|(score, _)| *score)
        .map(|(_, known)| known)
}

#[cfg(test)]
mod tests {
    use crate::rules::tests_support::{ids, manifest, run};
    use serde_json::json;

    #[test]
    fn test_bad_versions() {
        let mut m = manifest();
        m.manifest_version = "1.0".to_string();
        m.schema_version = "v1.0.0".to_string();
        let d = run(&m, "MANIFEST-001");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].path, "manifest_version");
        assert_eq!(run(&m, "MANIFEST-002")[0].path, "schema_version");
    }

    #[test]
    fn test_blank_metadata_name() {
        let mut m = manifest();
        m.metadata.name = "  ".to_string();
        assert_eq!(ids(&run(&m, "MANIFEST-003")), vec!["MANIFEST-003"]);
    }

    #[test]
    fn test_no_frames() {
        let mut m = manifest();
        m.frames.clear();
        let d = run(&m, "MANIFEST-004");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].path, "frames");
    }

    #[test]
    fn test_frame_limit() {
        let mut m = manifest();
        let frame = m.frames[0].clone();
        m.frames = vec![frame; 51];
        assert_eq!(run(&m, "MANIFEST-W001").len(), 1);
        m.frames.truncate(50);
        assert!(run(&m, "MANIFEST-W001").is_empty());
    }

    #[test]
    fn test_unknown_field_suggests_nearest() {
        let m = manifest()
            .with_extra("frams", json!([]))
            .with_extra("keysets", json!([]));
        let d = run(&m, "MANIFEST-W002");
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].path, "frams");
        assert!(d[0].fix.contains("'frames'"), "{}", d[0].fix);
        assert_eq!(d[1].path, "keysets");
    }
}
