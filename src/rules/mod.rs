//! Rule catalogue
//!
//! Every structural and semantic check is a [`Rule`]: an identifier, a
//! severity and a plain function from the manifest (plus derived context)
//! to diagnostics. [`CATALOGUE`] fixes the evaluation order; adding a rule
//! means appending an entry.
//!
//! ## Groups
//! 1. **Manifest**: version shape, metadata, size advisories, unknown fields
//! 2. **Frame**: hooks present, grain, naming, source shape, reuse
//! 3. **Hook**: required fields, naming, role, casing, expression shape
//! 4. **Key set**: global uniqueness of derived key identifiers
//! 5. **Concept**: description length, duplicates, usage

mod concept;
mod frame;
mod hook;
mod keyset;
mod manifest;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::ValidatorConfig;
use crate::diagnostics::{compare_paths, Diagnostic, Severity};
use crate::expression::{classify, ExprClass};
use crate::model::Manifest;
use crate::registry::{self, HookRef};

/// Signature shared by all rule functions
pub type RuleCheck = fn(&Rule, &RuleContext<'_>) -> Vec<Diagnostic>;

/// One entry of the catalogue
pub struct Rule {
    /// Stable identifier, `<ENTITY>-[W]<NNN>`
    pub id: &'static str,
    pub severity: Severity,
    /// One-line description for listings
    pub summary: &'static str,
    check: RuleCheck,
}

impl Rule {
    const fn new(id: &'static str, severity: Severity, summary: &'static str, check: RuleCheck) -> Self {
        Self {
            id,
            severity,
            summary,
            check,
        }
    }

    /// Build a diagnostic carrying this rule's id and severity
    pub fn emit(
        &self,
        message: impl Into<String>,
        path: impl Into<String>,
        fix: impl Into<String>,
    ) -> Diagnostic {
        Diagnostic::new(self.id, self.severity, message, path, fix)
    }

    /// Run the rule; output is ordered by path (stable for equal paths)
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = (self.check)(self, ctx);
        diagnostics.sort_by(|a, b| compare_paths(&a.path, &b.path));
        diagnostics
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("severity", &self.severity)
            .finish()
    }
}

/// Full-manifest view handed to every rule
///
/// Registries and expression classes are computed once here instead of
/// each rule walking sibling entities itself.
pub struct RuleContext<'a> {
    pub manifest: &'a Manifest,
    pub config: &'a ValidatorConfig,
    /// Concept names referenced by at least one hook
    pub concept_names: BTreeSet<String>,
    /// Hooks grouped by name
    pub hook_index: BTreeMap<String, Vec<HookRef<'a>>>,
    /// Hooks grouped by derived key identifier
    pub key_index: BTreeMap<String, Vec<HookRef<'a>>>,
    expr_classes: Vec<Vec<ExprClass>>,
}

impl<'a> RuleContext<'a> {
    pub fn new(manifest: &'a Manifest, config: &'a ValidatorConfig) -> Self {
        let expr_classes = manifest
            .frames
            .iter()
            .map(|frame| frame.hooks.iter().map(|hook| classify(&hook.expr)).collect())
            .collect();

        Self {
            manifest,
            config,
            concept_names: registry::derive_concept_names(manifest),
            hook_index: registry::derive_hook_index(manifest),
            key_index: registry::derive_key_index(manifest),
            expr_classes,
        }
    }

    /// Classification of `frames[frame].hooks[hook].expr`
    pub fn expr_class(&self, frame: usize, hook: usize) -> &ExprClass {
        &self.expr_classes[frame][hook]
    }
}

/// The ordered rule catalogue
pub static CATALOGUE: &[Rule] = &[
    Rule::new("MANIFEST-001", Severity::Error, "manifest_version is MAJOR.MINOR.PATCH", manifest::manifest_version),
    Rule::new("MANIFEST-002", Severity::Error, "schema_version is MAJOR.MINOR.PATCH", manifest::schema_version),
    Rule::new("MANIFEST-003", Severity::Error, "metadata.name is not blank", manifest::metadata_name),
    Rule::new("MANIFEST-004", Severity::Error, "manifest declares at least one frame", manifest::frames_present),
    Rule::new("FRAME-001", Severity::Error, "frame has at least one hook", frame::has_hooks),
    Rule::new("FRAME-002", Severity::Error, "frame name is <schema>.<table> in lower_snake_case", frame::name_format),
    Rule::new("FRAME-003", Severity::Error, "frame has at least one primary hook", frame::has_primary_hook),
    Rule::new("FRAME-004", Severity::Error, "frame declares a source", frame::source_present),
    Rule::new("FRAME-005", Severity::Error, "source has exactly one of relation or path", frame::source_exclusive),
    Rule::new("FRAME-006", Severity::Error, "source relation/path is not blank", frame::source_nonempty),
    Rule::new("HOOK-001", Severity::Error, "hook has name, role, concept, source and expr", hook::required_fields),
    Rule::new("HOOK-002", Severity::Error, "hook name is <prefix><concept>[__<qualifier>]", hook::name_format),
    Rule::new("HOOK-003", Severity::Error, "hook role is primary or foreign", hook::role),
    Rule::new("HOOK-004", Severity::Error, "concept and qualifier are lower_snake_case", hook::concept_casing),
    Rule::new("HOOK-005", Severity::Error, "source and tenant are UPPER_SNAKE_CASE", hook::source_casing),
    Rule::new("HOOK-006", Severity::Error, "expr is a pure expression", hook::expr_shape),
    Rule::new("HOOK-007", Severity::Error, "hook names are unique within a frame", hook::name_unique_in_frame),
    Rule::new("KEYSET-001", Severity::Error, "derived key identifiers are globally unique", keyset::unique_key_identifiers),
    Rule::new("CONCEPT-001", Severity::Error, "declared concept is used by a hook", concept::used_by_hook),
    Rule::new("CONCEPT-002", Severity::Error, "concept description is 10 to 200 characters", concept::description_length),
    Rule::new("CONCEPT-003", Severity::Error, "concept names are unique", concept::no_duplicates),
    Rule::new("MANIFEST-W001", Severity::Warn, "frame count within the soft limit", manifest::too_many_frames),
    Rule::new("MANIFEST-W002", Severity::Warn, "no unknown top-level fields", manifest::unknown_fields),
    Rule::new("FRAME-W001", Severity::Warn, "hook count per frame within the soft limit", frame::too_many_hooks),
    Rule::new("FRAME-W002", Severity::Warn, "source not shared with another frame", frame::duplicate_source),
    Rule::new("HOOK-W001", Severity::Warn, "weak prefix agrees with concept is_weak", hook::weak_prefix_mismatch),
    Rule::new("HOOK-W002", Severity::Warn, "expr is deterministic", hook::expr_non_deterministic),
    Rule::new("CONCEPT-W001", Severity::Warn, "concept count within the soft limit", concept::too_many_concepts),
];

/// Look up a rule by id
pub fn find(id: &str) -> Option<&'static Rule> {
    CATALOGUE.iter().find(|rule| rule.id == id)
}

/// `frames[i]` paths paired with frames
fn frame_paths(manifest: &Manifest) -> impl Iterator<Item = (String, &crate::model::Frame)> {
    manifest
        .frames
        .iter()
        .enumerate()
        .map(|(i, frame)| (format!("frames[{i}]"), frame))
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;
    use crate::model::{Concept, Frame, FrameSource, Hook, HookRole, Metadata};
    use chrono::{TimeZone, Utc};

    /// Smallest manifest passing every rule
    pub fn manifest() -> Manifest {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Manifest::new("1.0.0", "1.0.0", Metadata::new("sales", at))
            .with_frame(
                Frame::new("frame.customer", FrameSource::relation("psa.customer")).with_hook(
                    Hook::new("_hk__customer", HookRole::Primary, "customer", "CRM", "customer_id"),
                ),
            )
            .with_concept(Concept::new("customer", "A person or company that buys"))
    }

    pub fn run(manifest: &Manifest, id: &str) -> Vec<Diagnostic> {
        run_with(manifest, &ValidatorConfig::default(), id)
    }

    pub fn run_with(manifest: &Manifest, config: &ValidatorConfig, id: &str) -> Vec<Diagnostic> {
        let ctx = RuleContext::new(manifest, config);
        find(id).expect("rule exists").evaluate(&ctx)
    }

    pub fn ids(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.rule_id.as_str()).collect()
    }
}
